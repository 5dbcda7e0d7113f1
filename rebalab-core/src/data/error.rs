use std::path::PathBuf;
use thiserror::Error;

use crate::error::InputShapeError;

/// Structured error types for price data loading.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("invalid date '{value}' at row {row} (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("invalid price '{value}' for '{asset}' at row {row}")]
    InvalidPrice {
        row: usize,
        asset: String,
        value: String,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported price file extension: {0}")]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Shape(#[from] InputShapeError),
}
