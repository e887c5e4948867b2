//! Data cleaning module for the housing dataset.
//!
//! This module provides functionality for:
//! - Removing exact duplicate rows
//! - Applying the repair rule table (row drops, constant/median/mode fills,
//!   category-median replacement of inconsistent values)
//! - The `load_and_clean` entry point tying loading, diagnosis, repair and
//!   saving together

mod rules;

pub use rules::{
    EmptyMedianPolicy, FillValue, RepairAction, RepairRule, RuleCondition, default_rules,
};

use crate::config::CleaningConfig;
use crate::error::{ProcessingError, Result};
use crate::loader::{read_csv, write_csv};
use crate::quality::{DataQualityAnalyzer, QualityReport};
use crate::types::{CleaningOutcome, CleaningSummary};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Remove exact duplicate rows, keeping the first occurrence in row order.
pub fn drop_duplicate_rows(df: DataFrame) -> Result<DataFrame> {
    Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
}

/// Loads, diagnoses, repairs and optionally saves a housing dataset.
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: CleaningConfig,
}

static_assertions::assert_impl_all!(DataCleaner: Send, Sync);

impl DataCleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Read `file_path`, report its quality, repair it and optionally write it
    /// to `save_path`.
    ///
    /// # Errors
    ///
    /// - [`ProcessingError::NotFound`] if `file_path` does not exist (nothing
    ///   is written in that case)
    /// - [`ProcessingError::Parse`] if the file is not valid CSV
    /// - [`ProcessingError::EmptyMedian`] if a category-median rule has no
    ///   qualifying rows and is configured to fail
    pub fn load_and_clean(
        &self,
        file_path: impl AsRef<Path>,
        save_path: Option<&Path>,
    ) -> Result<CleaningOutcome> {
        let file_path = file_path.as_ref();
        if !file_path.exists() {
            return Err(ProcessingError::NotFound(file_path.to_path_buf()));
        }

        info!("Loading dataset: {}", file_path.display());
        let df = read_csv(
            file_path,
            self.config.separator,
            self.config.infer_schema_length,
        )?;

        let mut outcome = self.clean(df)?;

        if let Some(save_path) = save_path {
            write_csv(&mut outcome.data, save_path, self.config.separator)?;
            outcome.summary.saved_to = Some(save_path.display().to_string());
        }

        Ok(outcome)
    }

    /// Diagnose and repair an in-memory dataset.
    pub fn clean(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let start_time = Instant::now();

        let quality = self.diagnose(&df)?;
        quality.log();

        let mut summary = CleaningSummary::new();
        summary.rows_before = df.height();
        summary.columns = df.width();

        info!("[Cleaning] Applying repairs...");
        let df = self.repair(df, &mut summary)?;

        summary.rows_after = df.height();
        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Cleaning complete: {} -> {} rows, {} repairs",
            summary.rows_before,
            summary.rows_after,
            summary.repairs.len()
        );

        Ok(CleaningOutcome {
            data: df,
            quality,
            summary,
        })
    }

    /// Read-only diagnosis using this cleaner's rule table.
    pub fn diagnose(&self, df: &DataFrame) -> Result<QualityReport> {
        DataQualityAnalyzer::diagnose(df, &self.config.rules, self.config.missing_display_limit)
    }

    fn repair(&self, mut df: DataFrame, summary: &mut CleaningSummary) -> Result<DataFrame> {
        if self.config.remove_duplicates {
            let before = df.height();
            df = drop_duplicate_rows(df)?;
            summary.duplicates_removed = before - df.height();
            if summary.duplicates_removed > 0 {
                info!("Removed {} duplicate rows", summary.duplicates_removed);
            } else {
                debug!("No duplicate rows to remove");
            }
        }

        for rule in &self.config.rules {
            let (repaired, record) = rule.apply(df)?;
            df = repaired;
            if let Some(record) = record {
                summary.repairs.push(record);
            }
        }

        Ok(df)
    }
}

/// Load and clean with the default housing configuration.
///
/// Returns only the repaired dataset; use [`DataCleaner`] for the quality
/// report and repair summary.
pub fn load_and_clean(file_path: impl AsRef<Path>, save_path: Option<&Path>) -> Result<DataFrame> {
    Ok(DataCleaner::default()
        .load_and_clean(file_path, save_path)?
        .data)
}
