use crate::cleaner::{RepairRule, RuleCondition, drop_duplicate_rows};
use crate::error::Result;
use crate::utils::{count_selected, format_percentage};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Missing-value count for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingColumn {
    pub column: String,
    pub missing: usize,
    /// Share of the original rows, 0-100.
    pub percentage: f64,
}

/// Rows violating a real-world expectation (e.g. a house with no land).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub column: String,
    pub description: String,
    pub rows: usize,
}

/// Read-only diagnosis of a freshly loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub rows: usize,
    pub columns: usize,
    pub duplicate_rows: usize,
    /// Columns with at least one missing value, most missing first.
    pub missing: Vec<MissingColumn>,
    pub inconsistencies: Vec<Inconsistency>,
    /// How many entries of `missing` are shown when the report is printed.
    pub missing_display_limit: usize,
}

impl QualityReport {
    /// The `limit` columns with the most missing values.
    pub fn top_missing(&self, limit: usize) -> &[MissingColumn] {
        &self.missing[..self.missing.len().min(limit)]
    }

    /// Missing count for a column (0 if it has none or does not exist).
    pub fn missing_in(&self, column: &str) -> usize {
        self.missing
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.missing)
            .unwrap_or(0)
    }

    /// Emit the report through `tracing`.
    pub fn log(&self) {
        info!(
            "[Diagnosis] Initial size: {} rows, {} columns",
            self.rows, self.columns
        );

        if self.duplicate_rows > 0 {
            warn!(
                "Found {} duplicate rows (removed during cleaning)",
                self.duplicate_rows
            );
        } else {
            info!("No duplicate rows");
        }

        if self.missing.is_empty() {
            info!("No missing values");
        } else {
            warn!("Missing values (top {}):", self.missing_display_limit);
            for m in self.top_missing(self.missing_display_limit) {
                warn!(
                    "  - {}: {} missing ({})",
                    m.column,
                    m.missing,
                    format_percentage(m.missing, self.rows)
                );
            }
        }

        for inconsistency in &self.inconsistencies {
            if inconsistency.rows > 0 {
                warn!(
                    "Logical inconsistency: {} rows with {}",
                    inconsistency.rows, inconsistency.description
                );
            }
        }
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows: {}, Columns: {}", self.rows, self.columns)?;
        writeln!(f, "Duplicate rows: {}", self.duplicate_rows)?;
        if self.missing.is_empty() {
            writeln!(f, "Missing values: none")?;
        } else {
            writeln!(f, "Missing values (top {}):", self.missing_display_limit)?;
            for m in self.top_missing(self.missing_display_limit) {
                writeln!(f, "  {:<20} {:>8} ({:.1}%)", m.column, m.missing, m.percentage)?;
            }
        }
        for inconsistency in &self.inconsistencies {
            writeln!(
                f,
                "Inconsistent rows ({}): {}",
                inconsistency.description, inconsistency.rows
            )?;
        }
        Ok(())
    }
}

/// Computes a [`QualityReport`] without touching the data.
pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Diagnose duplicates, missing values and rule-defined inconsistencies.
    ///
    /// Every `ZeroInCategory` rule whose columns are present contributes one
    /// inconsistency count.
    pub fn diagnose(
        df: &DataFrame,
        rules: &[RepairRule],
        missing_display_limit: usize,
    ) -> Result<QualityReport> {
        let rows = df.height();

        let duplicate_rows = rows - drop_duplicate_rows(df.clone())?.height();

        Ok(QualityReport {
            rows,
            columns: df.width(),
            duplicate_rows,
            missing: Self::missing_by_column(df),
            inconsistencies: Self::inconsistencies(df, rules)?,
            missing_display_limit,
        })
    }

    fn missing_by_column(df: &DataFrame) -> Vec<MissingColumn> {
        let rows = df.height();
        let mut missing: Vec<MissingColumn> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() > 0)
            .map(|col| MissingColumn {
                column: col.name().to_string(),
                missing: col.null_count(),
                percentage: if rows > 0 {
                    col.null_count() as f64 / rows as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        // stable sort keeps frame order among equal counts
        missing.sort_by(|a, b| b.missing.cmp(&a.missing));
        missing
    }

    fn inconsistencies(df: &DataFrame, rules: &[RepairRule]) -> Result<Vec<Inconsistency>> {
        let mut found = Vec::new();
        for rule in rules {
            if !matches!(rule.condition, RuleCondition::ZeroInCategory { .. }) {
                continue;
            }
            if let Some(mask) = rule.matching_rows(df)? {
                found.push(Inconsistency {
                    column: rule.column.clone(),
                    description: format!("{} {}", rule.column, rule.condition),
                    rows: count_selected(&mask),
                });
            }
        }
        Ok(found)
    }
}
