use crate::error::{ProcessingError, Result};
use crate::utils::{float_series, has_column, numeric_values, string_mode, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Learned median and scaling parameters for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericTransform {
    pub column: String,
    /// Substitute for missing values.
    pub median: f64,
    pub mean: f64,
    /// Population standard deviation after imputation, 1.0 for constant columns.
    pub scale: f64,
}

impl NumericTransform {
    fn fit(series: &Series) -> Result<Self> {
        let column = series.name().to_string();
        let values = float_series(series)?;
        let median = values
            .median()
            .ok_or_else(|| ProcessingError::NoValidValues(column.clone()))?;

        let imputed = values.f64()?.fill_null_with_values(median)?;
        let (Some(mean), Some(std)) = (imputed.mean(), imputed.std(0)) else {
            return Err(ProcessingError::NoValidValues(column));
        };
        let scale = if std > 0.0 { std } else { 1.0 };

        Ok(Self {
            column,
            median,
            mean,
            scale,
        })
    }

    fn transform(&self, series: &Series) -> Result<Series> {
        let scaled: Vec<f64> = numeric_values(series)?
            .into_iter()
            .map(|v| (v.unwrap_or(self.median) - self.mean) / self.scale)
            .collect();
        Ok(Series::new(self.column.as_str().into(), scaled))
    }
}

/// Learned fill value and category list for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalTransform {
    pub column: String,
    /// Most frequent category, used for missing values.
    pub fill: String,
    /// Known categories in sorted order; one output column each.
    pub categories: Vec<String>,
}

impl CategoricalTransform {
    fn fit(series: &Series) -> Result<Self> {
        let column = series.name().to_string();
        let values = string_values(series)?;
        let fill = string_mode(values.iter().flatten().map(String::as_str))
            .ok_or_else(|| ProcessingError::NoValidValues(column.clone()))?;

        let categories: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.unwrap_or_else(|| fill.clone()))
            .collect();

        Ok(Self {
            column,
            fill,
            categories: categories.into_iter().collect(),
        })
    }

    fn output_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |category| format!("{}_{}", self.column, category))
    }

    fn transform(&self, series: &Series) -> Result<Vec<Series>> {
        let values: Vec<String> = string_values(series)?
            .into_iter()
            .map(|v| v.unwrap_or_else(|| self.fill.clone()))
            .collect();

        // categories unseen during fit get zeros in every indicator
        Ok(self
            .categories
            .iter()
            .zip(self.output_names())
            .map(|(category, name)| {
                let indicator: Vec<f64> = values
                    .iter()
                    .map(|v| if v == category { 1.0 } else { 0.0 })
                    .collect();
                Series::new(name.into(), indicator)
            })
            .collect())
    }
}

/// Column-wise preprocessing for a regression model.
///
/// Numeric columns are median-imputed then standardised; categorical columns
/// are imputed with their most frequent value then one-hot encoded. Columns
/// in neither list are dropped from the output.
///
/// # Example
///
/// ```rust,ignore
/// use housing_processing::features::build_preprocessor;
///
/// let mut preprocessor = build_preprocessor();
/// let train_matrix = preprocessor.fit_transform(&train)?;
/// let test_matrix = preprocessor.transform(&test)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    #[serde(default)]
    numeric: Vec<NumericTransform>,
    #[serde(default)]
    categorical: Vec<CategoricalTransform>,
    #[serde(default)]
    fitted: bool,
}

static_assertions::assert_impl_all!(Preprocessor: Send, Sync);

impl Preprocessor {
    pub fn new<N, C>(numeric_columns: N, categorical_columns: C) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            numeric_columns: numeric_columns.into_iter().map(Into::into).collect(),
            categorical_columns: categorical_columns.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Learn medians, scaling parameters, fill values and categories.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::ColumnNotFound`] if a listed column is absent and
    /// [`ProcessingError::NoValidValues`] if a listed column has no values.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let numeric = self
            .numeric_columns
            .iter()
            .map(|name| NumericTransform::fit(required_column(df, name)?))
            .collect::<Result<Vec<_>>>()?;

        let categorical = self
            .categorical_columns
            .iter()
            .map(|name| CategoricalTransform::fit(required_column(df, name)?))
            .collect::<Result<Vec<_>>>()?;

        for transform in &numeric {
            debug!(
                "[{}] median {:.3}, mean {:.3}, scale {:.3}",
                transform.column, transform.median, transform.mean, transform.scale
            );
        }
        for transform in &categorical {
            debug!(
                "[{}] fill '{}', {} categories",
                transform.column,
                transform.fill,
                transform.categories.len()
            );
        }

        self.numeric = numeric;
        self.categorical = categorical;
        self.fitted = true;

        info!(
            "Preprocessor fitted on {} rows: {} output features",
            df.height(),
            self.feature_names().len()
        );
        Ok(self)
    }

    /// Produce the encoded feature matrix (Float64 columns only).
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.fitted {
            return Err(ProcessingError::NotFitted);
        }

        let mut columns: Vec<Column> = Vec::with_capacity(self.feature_names().len());
        for transform in &self.numeric {
            let series = required_column(df, &transform.column)?;
            columns.push(transform.transform(series)?.into());
        }
        for transform in &self.categorical {
            let series = required_column(df, &transform.column)?;
            columns.extend(transform.transform(series)?.into_iter().map(Column::from));
        }

        Ok(DataFrame::new(columns)?)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output column names in order; empty before `fit`.
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric
            .iter()
            .map(|t| t.column.clone())
            .chain(self.categorical.iter().flat_map(|t| t.output_names()))
            .collect()
    }

    /// Fitted parameters of the numeric columns.
    pub fn numeric_transforms(&self) -> &[NumericTransform] {
        &self.numeric
    }

    /// Fitted parameters of the categorical columns.
    pub fn categorical_transforms(&self) -> &[CategoricalTransform] {
        &self.categorical
    }
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    if !has_column(df, name) {
        return Err(ProcessingError::ColumnNotFound(name.to_string()));
    }
    Ok(df.column(name)?.as_materialized_series())
}
