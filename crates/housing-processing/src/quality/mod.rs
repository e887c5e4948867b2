//! Data quality diagnosis module.
//!
//! This module reports duplicate rows, missing values and logically
//! inconsistent rows before any repair happens.

mod analyzer;

pub use analyzer::{DataQualityAnalyzer, Inconsistency, MissingColumn, QualityReport};
