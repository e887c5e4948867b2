//! Shared utilities for the housing data pipeline.
//!
//! Column extraction and small statistics helpers used by the cleaner, the
//! feature preprocessor and the plotting routines.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of all numeric columns, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Check whether a column with the given name exists.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|col| col.as_str() == name)
}

/// Number of `true` entries in a mask.
pub fn count_selected(mask: &BooleanChunked) -> usize {
    mask.into_iter().filter(|v| *v == Some(true)).count()
}

// =============================================================================
// Column Extraction
// =============================================================================

/// Cast a Series to `Float64`, refusing values that do not parse as numbers.
///
/// Fails with [`ProcessingError::InvalidInput`] naming the column instead of
/// turning unparsable cells into nulls.
pub fn float_series(series: &Series) -> Result<Series> {
    series.strict_cast(&DataType::Float64).map_err(|_| {
        ProcessingError::InvalidInput(format!(
            "column '{}' holds non-numeric values",
            series.name()
        ))
    })
}

/// Read a Series as optional f64 values.
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    Ok(float_series(series)?.f64()?.into_iter().collect())
}

/// Read a Series as optional owned strings.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Non-null f64 values of a Series.
pub fn present_numeric_values(series: &Series) -> Result<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

// =============================================================================
// Statistics
// =============================================================================

/// Most frequent value of a slice.
///
/// Values are sorted ascending and the first longest run wins, so ties
/// resolve to the smallest tied value.
pub fn numeric_mode(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mut best = sorted[0];
    let mut best_run = 0usize;
    let mut run_start = 0usize;
    for i in 1..=sorted.len() {
        if i == sorted.len() || sorted[i] != sorted[run_start] {
            let run = i - run_start;
            if run > best_run {
                best_run = run;
                best = sorted[run_start];
            }
            run_start = i;
        }
    }
    Some(best)
}

/// Most frequent string; ties resolve to the lexicographically smallest.
pub fn string_mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for val in values {
        *counts.entry(val).or_insert(0) += 1;
    }

    // BTreeMap iterates in key order; strict `>` keeps the first (smallest) key
    let mut best: Option<(&str, usize)> = None;
    for (val, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}

/// Fraction formatted as a percentage with one decimal.
pub fn format_percentage(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 / whole as f64 * 100.0)
}

// =============================================================================
// Tests
// =============================================================================
