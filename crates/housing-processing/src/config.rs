//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. The configuration is plain
//! serde data so it can also be read from a JSON file.

use crate::cleaner::{RepairRule, default_rules};
use crate::error::{ProcessingError, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for loading and cleaning a dataset.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use housing_processing::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .missing_display_limit(10)
///     .remove_duplicates(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Repair rules, evaluated once in order after duplicate removal.
    /// Default: the housing table (Price, Car, BuildingArea, YearBuilt,
    /// CouncilArea, Landsize)
    pub rules: Vec<RepairRule>,

    /// Whether to remove exact duplicate rows before applying rules.
    /// Default: true
    pub remove_duplicates: bool,

    /// Number of columns listed in the missing-value diagnosis.
    /// Default: 5
    pub missing_display_limit: usize,

    /// Rows scanned to infer the CSV schema. `None` scans the whole file.
    /// Default: None
    pub infer_schema_length: Option<usize>,

    /// Field separator for reading and writing CSV files.
    /// Default: b','
    pub separator: u8,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            remove_duplicates: true,
            missing_display_limit: 5,
            infer_schema_length: None,
            separator: b',',
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Read a JSON serialized configuration and validate it.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> crate::error::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(ProcessingError::from)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: CleaningConfig = serde_json::from_str(&content)
            .map_err(ProcessingError::from)
            .context(format!("Invalid config file: {}", path.display()))?;
        config
            .validate()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.missing_display_limit == 0 {
            return Err(ConfigValidationError::InvalidDisplayLimit(
                self.missing_display_limit,
            ));
        }

        if !self.separator.is_ascii() || self.separator == b'\n' || self.separator == b'"' {
            return Err(ConfigValidationError::InvalidSeparator(self.separator));
        }

        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate()
                .map_err(|reason| ConfigValidationError::InvalidRule { index, reason })?;
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid missing display limit: {0} (must be at least 1)")]
    InvalidDisplayLimit(usize),

    #[error("Invalid separator byte: {0:#04x}")]
    InvalidSeparator(u8),

    #[error("Invalid repair rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    rules: Option<Vec<RepairRule>>,
    extra_rules: Vec<RepairRule>,
    remove_duplicates: Option<bool>,
    missing_display_limit: Option<usize>,
    infer_schema_length: Option<Option<usize>>,
    separator: Option<u8>,
}

impl CleaningConfigBuilder {
    /// Replace the whole repair table.
    pub fn rules(mut self, rules: Vec<RepairRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Append a rule after the table.
    pub fn add_rule(mut self, rule: RepairRule) -> Self {
        self.extra_rules.push(rule);
        self
    }

    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Set how many columns the missing-value diagnosis lists.
    pub fn missing_display_limit(mut self, limit: usize) -> Self {
        self.missing_display_limit = Some(limit);
        self
    }

    /// Limit schema inference to the first `rows` rows (`None` = all rows).
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the CSV field separator.
    pub fn separator(mut self, separator: u8) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let mut rules = self.rules.unwrap_or_else(default_rules);
        rules.extend(self.extra_rules);

        let config = CleaningConfig {
            rules,
            remove_duplicates: self.remove_duplicates.unwrap_or(true),
            missing_display_limit: self.missing_display_limit.unwrap_or(5),
            infer_schema_length: self.infer_schema_length.unwrap_or(None),
            separator: self.separator.unwrap_or(b','),
        };

        config.validate()?;
        Ok(config)
    }
}
