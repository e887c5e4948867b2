//! Feature preprocessing for the price regression model.
//!
//! [`build_preprocessor`] returns an unfitted [`Preprocessor`] configured
//! with the housing feature lists.

mod preprocessor;

pub use preprocessor::{CategoricalTransform, NumericTransform, Preprocessor};

/// Numeric model inputs: median imputation, then standard scaling.
pub const NUMERIC_FEATURES: [&str; 9] = [
    "Rooms",
    "Distance",
    "Postcode",
    "Bedroom2",
    "Bathroom",
    "Car",
    "Landsize",
    "BuildingArea",
    "YearBuilt",
];

/// Categorical model inputs: most-frequent imputation, then one-hot encoding.
pub const CATEGORICAL_FEATURES: [&str; 3] = ["Type", "Method", "Regionname"];

/// Unfitted preprocessor for the housing feature lists.
pub fn build_preprocessor() -> Preprocessor {
    Preprocessor::new(NUMERIC_FEATURES, CATEGORICAL_FEATURES)
}
