//! Statistical imputation methods.
//!
//! Provides constant, median, mode and category-median fills. Every fill
//! targets the rows selected by a boolean mask so that the same helpers serve
//! both "missing value" and "inconsistent value" repairs.

use crate::error::{ProcessingError, Result};
use crate::utils::{float_series, numeric_mode, numeric_values, string_mode, string_values};
use polars::prelude::*;

/// Statistical imputation methods for filling selected cells.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Overwrite the masked cells of a numeric column with `fill_value`.
    ///
    /// The column is rewritten as `Float64`. Returns the number of cells written.
    /// A column holding text that does not parse as a number is rejected with
    /// [`ProcessingError::InvalidInput`] and left unchanged.
    pub fn fill_numeric(
        df: &mut DataFrame,
        col_name: &str,
        mask: &BooleanChunked,
        fill_value: f64,
    ) -> Result<usize> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let values = numeric_values(&series)?;

        let mut filled = 0;
        let result_vec: Vec<Option<f64>> = values
            .into_iter()
            .zip(mask.into_iter())
            .map(|(val, selected)| {
                if selected.unwrap_or(false) {
                    filled += 1;
                    Some(fill_value)
                } else {
                    val
                }
            })
            .collect();

        df.replace(col_name, Series::new(series.name().clone(), result_vec))?;
        Ok(filled)
    }

    /// Overwrite the masked cells of a column with a string constant.
    ///
    /// The column is rewritten as `String`. Returns the number of cells written.
    pub fn fill_text(
        df: &mut DataFrame,
        col_name: &str,
        mask: &BooleanChunked,
        fill_value: &str,
    ) -> Result<usize> {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let values = string_values(&series)?;

        let mut filled = 0;
        let result_vec: Vec<Option<String>> = values
            .into_iter()
            .zip(mask.into_iter())
            .map(|(val, selected)| {
                if selected.unwrap_or(false) {
                    filled += 1;
                    Some(fill_value.to_string())
                } else {
                    val
                }
            })
            .collect();

        df.replace(col_name, Series::new(series.name().clone(), result_vec))?;
        Ok(filled)
    }

    /// Median of the unmasked, non-null values of a column.
    pub fn median_excluding(series: &Series, mask: &BooleanChunked) -> Result<Option<f64>> {
        let kept = float_series(series)?.filter(&!mask)?;
        Ok(kept.median())
    }

    /// Mode of the unmasked, non-null values of a numeric column.
    pub fn numeric_mode_excluding(series: &Series, mask: &BooleanChunked) -> Result<Option<f64>> {
        let kept = float_series(series)?.filter(&!mask)?;
        let values: Vec<f64> = kept.f64()?.into_iter().flatten().collect();
        Ok(numeric_mode(&values))
    }

    /// Mode of the unmasked, non-null values of a text column.
    pub fn text_mode_excluding(series: &Series, mask: &BooleanChunked) -> Result<Option<String>> {
        let values = string_values(series)?;
        let kept: Vec<String> = values
            .into_iter()
            .zip(mask.into_iter())
            .filter(|(_, selected)| !selected.unwrap_or(false))
            .filter_map(|(val, _)| val)
            .collect();
        Ok(string_mode(kept.iter().map(String::as_str)))
    }

    /// Median of `col_name` over rows where `category_col == category` and
    /// the value is strictly positive.
    ///
    /// Fails with [`ProcessingError::EmptyMedian`] when no row qualifies.
    pub fn category_positive_median(
        df: &DataFrame,
        col_name: &str,
        category_col: &str,
        category: &str,
    ) -> Result<f64> {
        let values = float_series(df.column(col_name)?.as_materialized_series())?;
        let categories = df
            .column(category_col)?
            .as_materialized_series()
            .cast(&DataType::String)?;

        let selected = &values.f64()?.gt(0.0) & &categories.str()?.equal(category);
        let positives = values.filter(&selected)?;

        positives.median().ok_or_else(|| ProcessingError::EmptyMedian {
            column: col_name.to_string(),
            category: category.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn null_mask(df: &DataFrame, col: &str) -> BooleanChunked {
        df.column(col).unwrap().as_materialized_series().is_null()
    }

    // ========================================================================
    // fill_numeric() tests
    // ========================================================================

    #[test]
    fn test_fill_numeric_basic() {
        let mut df = df![
            "Car" => [Some(1i64), None, Some(2), None],
        ]
        .unwrap();
        let mask = null_mask(&df, "Car");

        let filled = StatisticalImputer::fill_numeric(&mut df, "Car", &mask, 0.0).unwrap();

        assert_eq!(filled, 2);
        let car = df.column("Car").unwrap();
        assert_eq!(car.null_count(), 0);
        assert_eq!(car.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(car.get(2).unwrap().try_extract::<f64>().unwrap(), 2.0);
        assert!(matches!(car.dtype(), DataType::Float64));
    }

    #[test]
    fn test_fill_numeric_empty_mask_writes_nothing() {
        let mut df = df![
            "Car" => [1.0, 2.0],
        ]
        .unwrap();
        let mask = null_mask(&df, "Car");

        let filled = StatisticalImputer::fill_numeric(&mut df, "Car", &mask, 0.0).unwrap();
        assert_eq!(filled, 0);
    }

    #[test]
    fn test_fill_numeric_rejects_text_outside_mask() {
        let mut df = df![
            "BuildingArea" => [Some("80"), None, Some("unknown"), Some("120")],
        ]
        .unwrap();
        let mask = null_mask(&df, "BuildingArea");

        let result = StatisticalImputer::fill_numeric(&mut df, "BuildingArea", &mask, 100.0);

        assert!(matches!(result, Err(ProcessingError::InvalidInput(_))));
        let area = df.column("BuildingArea").unwrap().as_materialized_series();
        assert_eq!(area.str().unwrap().get(2), Some("unknown"));
        assert_eq!(area.null_count(), 1);
    }

    // ========================================================================
    // fill_text() tests
    // ========================================================================

    #[test]
    fn test_fill_text_basic() {
        let mut df = df![
            "CouncilArea" => [Some("Yarra"), None, Some("Moonee Valley")],
        ]
        .unwrap();
        let mask = null_mask(&df, "CouncilArea");

        let filled =
            StatisticalImputer::fill_text(&mut df, "CouncilArea", &mask, "Unknown").unwrap();

        assert_eq!(filled, 1);
        let council = df.column("CouncilArea").unwrap().as_materialized_series();
        assert_eq!(council.null_count(), 0);
        assert_eq!(council.str().unwrap().get(1), Some("Unknown"));
        assert_eq!(council.str().unwrap().get(0), Some("Yarra"));
    }

    // ========================================================================
    // median / mode tests
    // ========================================================================

    #[test]
    fn test_median_excluding_ignores_masked_rows() {
        let series = Series::new("BuildingArea".into(), &[Some(1.0), None, Some(3.0), Some(100.0)]);
        let mask = BooleanChunked::from_slice("mask".into(), &[false, true, false, true]);

        let median = StatisticalImputer::median_excluding(&series, &mask).unwrap();
        assert_eq!(median, Some(2.0));
    }

    #[test]
    fn test_median_excluding_all_null() {
        let series = Series::new("BuildingArea".into(), &[Option::<f64>::None, None]);
        let mask = series.is_null();
        assert_eq!(StatisticalImputer::median_excluding(&series, &mask).unwrap(), None);
    }

    #[test]
    fn test_median_excluding_integer_column() {
        let series = Series::new("Rooms".into(), &[Some(2i64), Some(3), None, Some(4), Some(1)]);
        let mask = series.is_null();
        assert_eq!(
            StatisticalImputer::median_excluding(&series, &mask).unwrap(),
            Some(2.5)
        );
    }

    #[test]
    fn test_numeric_mode_excluding() {
        let series = Series::new(
            "YearBuilt".into(),
            &[Some(1970.0), None, Some(1970.0), Some(1900.0)],
        );
        let mask = series.is_null();
        assert_eq!(
            StatisticalImputer::numeric_mode_excluding(&series, &mask).unwrap(),
            Some(1970.0)
        );
    }

    #[test]
    fn test_text_mode_excluding() {
        let series = Series::new("Method".into(), &[Some("S"), Some("PI"), None, Some("S")]);
        let mask = series.is_null();
        assert_eq!(
            StatisticalImputer::text_mode_excluding(&series, &mask).unwrap(),
            Some("S".to_string())
        );
    }

    // ========================================================================
    // category_positive_median() tests
    // ========================================================================

    #[test]
    fn test_category_positive_median() {
        let df = df![
            "Type" => ["h", "h", "h", "h", "u"],
            "Landsize" => [100.0, 200.0, 300.0, 0.0, 5000.0],
        ]
        .unwrap();

        let median =
            StatisticalImputer::category_positive_median(&df, "Landsize", "Type", "h").unwrap();
        assert_eq!(median, 200.0);
    }

    #[test]
    fn test_category_positive_median_skips_missing() {
        let df = df![
            "Type" => [Some("h"), Some("h"), None, Some("h")],
            "Landsize" => [Some(120.0), None, Some(900.0), Some(140.0)],
        ]
        .unwrap();

        let median =
            StatisticalImputer::category_positive_median(&df, "Landsize", "Type", "h").unwrap();
        assert_eq!(median, 130.0);
    }

    #[test]
    fn test_category_positive_median_empty() {
        let df = df![
            "Type" => ["h", "u"],
            "Landsize" => [0.0, 150.0],
        ]
        .unwrap();

        let result = StatisticalImputer::category_positive_median(&df, "Landsize", "Type", "h");
        assert!(matches!(result, Err(ProcessingError::EmptyMedian { .. })));
    }
}
