//! Housing Price Data Pipeline Library
//!
//! Loading, cleaning, feature preprocessing and diagnostic charts for a
//! tabular housing-sales dataset, built on Polars.
//!
//! # Overview
//!
//! - **Loading**: CSV in and out ([`loader`])
//! - **Diagnosis**: duplicate rows, missing values per column, houses with no
//!   land ([`quality`])
//! - **Repair**: an explicit, ordered table of [`RepairRule`]s applied after
//!   duplicate removal ([`cleaner`])
//! - **Features**: median/standard-scaled numeric inputs and one-hot encoded
//!   categories for a regression model ([`features`])
//! - **Charts**: price histogram, correlation heatmap, predicted-vs-true
//!   scatter as SVG ([`plots`])
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use housing_processing::{build_preprocessor, load_and_clean};
//! use std::path::Path;
//!
//! // Clean with the default rule table and save the result
//! let df = load_and_clean("data/melb_data.csv", Some(Path::new("out/clean.csv")))?;
//!
//! // Build the model matrix
//! let mut preprocessor = build_preprocessor();
//! let features = preprocessor.fit_transform(&df)?;
//! ```
//!
//! # Configuration
//!
//! Use [`CleaningConfig`] and [`DataCleaner`] to change the rule table or
//! obtain the quality report alongside the data:
//!
//! ```rust,ignore
//! use housing_processing::{CleaningConfig, DataCleaner, RepairAction, RepairRule};
//!
//! let config = CleaningConfig::builder()
//!     .add_rule(RepairRule::on_missing("Bathroom", RepairAction::FillMedian))
//!     .missing_display_limit(10)
//!     .build()?;
//!
//! let outcome = DataCleaner::new(config).load_and_clean("data/melb_data.csv", None)?;
//! println!("{}", outcome.quality);
//! ```
//!
//! # Charts
//!
//! ```rust,ignore
//! use housing_processing::plots::{PlotStyle, plot_price_distribution};
//!
//! let style = PlotStyle::default();
//! plot_price_distribution(&df, Some(Path::new("figures")), &style)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod imputers;
pub mod loader;
pub mod plots;
pub mod quality;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{
    DataCleaner, EmptyMedianPolicy, FillValue, RepairAction, RepairRule, RuleCondition,
    default_rules, drop_duplicate_rows, load_and_clean,
};
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use features::{Preprocessor, build_preprocessor};
pub use imputers::StatisticalImputer;
pub use loader::{read_csv, write_csv};
pub use plots::{
    PlotStyle, correlation_matrix, plot_correlation_heatmap, plot_price_distribution,
    plot_true_vs_pred,
};
pub use quality::{DataQualityAnalyzer, QualityReport};
pub use types::{CleaningOutcome, CleaningSummary, RepairRecord, RunReport};
