//! Shared result types for the cleaning pipeline.
//!
//! These types are serializable so a run can be written out as a JSON report.

use crate::quality::QualityReport;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// A single repair that changed the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairRecord {
    /// Column the repair targeted.
    pub column: String,
    /// Action identifier (`drop_rows`, `fill_constant`, `fill_median`, ...).
    pub action: String,
    /// Rows removed or cells written.
    pub rows_affected: usize,
    /// Rendered fill value, if the action wrote one.
    pub fill_value: Option<String>,
}

impl RepairRecord {
    pub fn new(column: impl Into<String>, action: impl Into<String>, rows_affected: usize) -> Self {
        Self {
            column: column.into(),
            action: action.into(),
            rows_affected,
            fill_value: None,
        }
    }

    pub fn with_fill_value(mut self, value: impl Into<String>) -> Self {
        self.fill_value = Some(value.into());
        self
    }
}

/// Summary of one cleaning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns: usize,
    pub duplicates_removed: usize,
    pub repairs: Vec<RepairRecord>,
    /// Where the cleaned dataset was written, if anywhere.
    pub saved_to: Option<String>,
    pub generated_at: String,
    pub duration_ms: u64,
}

impl CleaningSummary {
    pub fn new() -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            ..Default::default()
        }
    }

    /// Total rows removed for any reason.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Record for a column, if one was produced.
    pub fn repair_for(&self, column: &str) -> Option<&RepairRecord> {
        self.repairs.iter().find(|r| r.column == column)
    }
}

/// Everything a cleaning run produces.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    /// The repaired dataset.
    pub data: DataFrame,
    /// Diagnosis of the dataset as loaded.
    pub quality: QualityReport,
    pub summary: CleaningSummary,
}

/// JSON-friendly view of a run (everything except the data itself).
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub input: &'a str,
    pub quality: &'a QualityReport,
    pub summary: &'a CleaningSummary,
}
