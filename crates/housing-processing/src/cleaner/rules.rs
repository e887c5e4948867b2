//! Repair rule table.
//!
//! A repair rule pairs a target column with a row condition and an action.
//! Rules are plain data (serde-friendly) so the table can be inspected,
//! loaded from JSON and tested one rule at a time.

use crate::error::{ProcessingError, Result};
use crate::imputers::StatisticalImputer;
use crate::types::RepairRecord;
use crate::utils::{count_selected, has_column, is_numeric_dtype, numeric_values, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Which rows of the target column a rule selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleCondition {
    /// The target cell is null.
    Missing,
    /// `category_column == category` and the target cell equals zero.
    ZeroInCategory {
        category_column: String,
        category: String,
    },
}

/// Constant used by [`RepairAction::FillConstant`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillValue::Number(n) => write!(f, "{}", n),
            FillValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// What to do when no qualifying rows exist for a category median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmptyMedianPolicy {
    /// Abort with [`ProcessingError::EmptyMedian`].
    #[default]
    Fail,
    /// Leave the selected cells untouched and log a warning.
    Skip,
}

/// How the selected rows are repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RepairAction {
    /// Remove the selected rows.
    DropRows,
    /// Write a constant into the selected cells.
    FillConstant(FillValue),
    /// Median of the column's other non-null values.
    FillMedian,
    /// Most frequent of the column's other non-null values.
    FillMode,
    /// Median of the column among rows of the same category with a positive
    /// value. Only meaningful with [`RuleCondition::ZeroInCategory`].
    FillCategoryMedian {
        #[serde(default)]
        on_empty: EmptyMedianPolicy,
    },
}

/// One entry of the repair table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairRule {
    pub column: String,
    pub condition: RuleCondition,
    pub action: RepairAction,
}

impl RepairRule {
    pub fn new(column: impl Into<String>, condition: RuleCondition, action: RepairAction) -> Self {
        Self {
            column: column.into(),
            condition,
            action,
        }
    }

    /// Shorthand for a rule acting on missing values.
    pub fn on_missing(column: impl Into<String>, action: RepairAction) -> Self {
        Self::new(column, RuleCondition::Missing, action)
    }

    /// Check that the action can be evaluated for the condition.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.column.trim().is_empty() {
            return Err("rule column must not be empty".to_string());
        }
        if matches!(self.action, RepairAction::FillCategoryMedian { .. })
            && !matches!(self.condition, RuleCondition::ZeroInCategory { .. })
        {
            return Err(format!(
                "rule for '{}': FillCategoryMedian requires a ZeroInCategory condition",
                self.column
            ));
        }
        Ok(())
    }

    /// Rows selected by the condition, or `None` if a referenced column is absent.
    pub fn matching_rows(&self, df: &DataFrame) -> Result<Option<BooleanChunked>> {
        if !has_column(df, &self.column) {
            return Ok(None);
        }
        let target = df.column(&self.column)?.as_materialized_series();

        match &self.condition {
            RuleCondition::Missing => Ok(Some(target.is_null())),
            RuleCondition::ZeroInCategory {
                category_column,
                category,
            } => {
                if !has_column(df, category_column) {
                    return Ok(None);
                }
                let values = numeric_values(target)?;
                let categories =
                    string_values(df.column(category_column)?.as_materialized_series())?;
                let selected: Vec<bool> = values
                    .iter()
                    .zip(categories.iter())
                    .map(|(val, cat)| *val == Some(0.0) && cat.as_deref() == Some(category))
                    .collect();
                Ok(Some(BooleanChunked::from_slice("mask".into(), &selected)))
            }
        }
    }

    /// Apply the rule.
    ///
    /// Returns the repaired frame and a record of what changed. A rule whose
    /// columns are absent, or whose condition selects no rows, returns the frame
    /// untouched and no record.
    pub fn apply(&self, mut df: DataFrame) -> Result<(DataFrame, Option<RepairRecord>)> {
        let Some(mask) = self.matching_rows(&df)? else {
            debug!("Rule for '{}' skipped: column absent", self.column);
            return Ok((df, None));
        };

        let matched = count_selected(&mask);
        if matched == 0 {
            debug!("Rule for '{}' skipped: no matching rows", self.column);
            return Ok((df, None));
        }

        let series = df.column(&self.column)?.as_materialized_series().clone();

        let record = match &self.action {
            RepairAction::DropRows => {
                df = df.filter(&!&mask)?;
                info!("[{}] Dropped {} rows ({})", self.column, matched, self.condition);
                RepairRecord::new(&self.column, "drop_rows", matched)
            }
            RepairAction::FillConstant(value) => {
                let filled = match value {
                    FillValue::Number(n) => {
                        StatisticalImputer::fill_numeric(&mut df, &self.column, &mask, *n)?
                    }
                    FillValue::Text(s) => {
                        StatisticalImputer::fill_text(&mut df, &self.column, &mask, s)?
                    }
                };
                info!("[{}] {} -> filled with {}", self.column, self.condition, value);
                RepairRecord::new(&self.column, "fill_constant", filled)
                    .with_fill_value(value.to_string())
            }
            RepairAction::FillMedian => {
                let Some(median) = StatisticalImputer::median_excluding(&series, &mask)? else {
                    warn!(
                        "[{}] No values to compute a median from; {} rows left as-is",
                        self.column, matched
                    );
                    return Ok((df, None));
                };
                let filled = StatisticalImputer::fill_numeric(&mut df, &self.column, &mask, median)?;
                info!(
                    "[{}] {} -> filled with median {:.1}",
                    self.column, self.condition, median
                );
                RepairRecord::new(&self.column, "fill_median", filled)
                    .with_fill_value(format!("{:.1}", median))
            }
            RepairAction::FillMode => {
                if is_numeric_dtype(series.dtype()) {
                    let Some(mode) = StatisticalImputer::numeric_mode_excluding(&series, &mask)?
                    else {
                        warn!(
                            "[{}] No values to compute a mode from; {} rows left as-is",
                            self.column, matched
                        );
                        return Ok((df, None));
                    };
                    let filled =
                        StatisticalImputer::fill_numeric(&mut df, &self.column, &mask, mode)?;
                    info!(
                        "[{}] {} -> filled with mode {}",
                        self.column, self.condition, mode
                    );
                    RepairRecord::new(&self.column, "fill_mode", filled)
                        .with_fill_value(mode.to_string())
                } else {
                    let Some(mode) = StatisticalImputer::text_mode_excluding(&series, &mask)? else {
                        warn!(
                            "[{}] No values to compute a mode from; {} rows left as-is",
                            self.column, matched
                        );
                        return Ok((df, None));
                    };
                    let filled =
                        StatisticalImputer::fill_text(&mut df, &self.column, &mask, &mode)?;
                    info!(
                        "[{}] {} -> filled with mode '{}'",
                        self.column, self.condition, mode
                    );
                    RepairRecord::new(&self.column, "fill_mode", filled).with_fill_value(mode)
                }
            }
            RepairAction::FillCategoryMedian { on_empty } => {
                let RuleCondition::ZeroInCategory {
                    category_column,
                    category,
                } = &self.condition
                else {
                    return Err(ProcessingError::InvalidConfig(format!(
                        "rule for '{}': FillCategoryMedian requires a ZeroInCategory condition",
                        self.column
                    )));
                };

                let median = match StatisticalImputer::category_positive_median(
                    &df,
                    &self.column,
                    category_column,
                    category,
                ) {
                    Ok(median) => median,
                    Err(ProcessingError::EmptyMedian { .. }) if *on_empty == EmptyMedianPolicy::Skip => {
                        warn!(
                            "[{}] No positive values among {} == '{}'; {} rows left as-is",
                            self.column, category_column, category, matched
                        );
                        return Ok((df, None));
                    }
                    Err(e) => return Err(e),
                };

                let filled = StatisticalImputer::fill_numeric(&mut df, &self.column, &mask, median)?;
                info!(
                    "[{}] Repaired {} rows ({}) -> category median {:.1}",
                    self.column, filled, self.condition, median
                );
                RepairRecord::new(&self.column, "fill_category_median", filled)
                    .with_fill_value(format!("{:.1}", median))
            }
        };

        Ok((df, Some(record)))
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCondition::Missing => write!(f, "missing values"),
            RuleCondition::ZeroInCategory {
                category_column,
                category,
            } => write!(f, "zero where {} == '{}'", category_column, category),
        }
    }
}

/// The repair table for the housing dataset, in evaluation order.
pub fn default_rules() -> Vec<RepairRule> {
    vec![
        RepairRule::on_missing("Price", RepairAction::DropRows),
        RepairRule::on_missing("Car", RepairAction::FillConstant(FillValue::Number(0.0))),
        RepairRule::on_missing("BuildingArea", RepairAction::FillMedian),
        RepairRule::on_missing("YearBuilt", RepairAction::FillMode),
        RepairRule::on_missing(
            "CouncilArea",
            RepairAction::FillConstant(FillValue::Text("Unknown".to_string())),
        ),
        RepairRule::new(
            "Landsize",
            RuleCondition::ZeroInCategory {
                category_column: "Type".to_string(),
                category: "h".to_string(),
            },
            RepairAction::FillCategoryMedian {
                on_empty: EmptyMedianPolicy::Fail,
            },
        ),
    ]
}
