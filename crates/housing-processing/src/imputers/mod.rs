//! Imputation module for filling selected cells.
//!
//! Statistical strategies (constant, median, mode, category median) used by
//! the repair rules.

mod statistical;

pub use statistical::StatisticalImputer;
