//! CSV input and output.

use crate::error::{ProcessingError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// Cell contents read as missing, besides empty fields.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Read a delimited file with a header row into a DataFrame.
///
/// Empty fields and the [`MISSING_MARKERS`] become nulls.
///
/// Fails with [`ProcessingError::NotFound`] if the path does not exist and
/// with [`ProcessingError::Parse`] if the content is not valid tabular data.
pub fn read_csv(
    path: &Path,
    separator: u8,
    infer_schema_length: Option<usize>,
) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(ProcessingError::NotFound(path.to_path_buf()));
    }

    debug!("Reading CSV: {}", path.display());
    let parse_error = |source| ProcessingError::Parse {
        path: path.to_path_buf(),
        source,
    };

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(
                    MISSING_MARKERS.iter().map(|m| (*m).into()).collect(),
                ))),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)
}

/// Write a DataFrame as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path, separator: u8) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}
