//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or slicing a predictor panel.
#[derive(Debug, Error)]
pub enum DataError {
    /// Input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Workbook does not contain the requested sheet
    #[error("Sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        /// Requested sheet name
        sheet: String,
        /// Sheets present in the workbook
        available: Vec<String>,
    },

    /// File extension is not a supported spreadsheet or CSV format
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// Spreadsheet reading error
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Periods are not strictly increasing
    #[error("Periods must be strictly increasing: {previous} is followed by {next}")]
    UnorderedPeriods {
        /// Period on the earlier row
        previous: i64,
        /// Period on the following row
        next: i64,
    },

    /// Invalid period range
    #[error("Invalid period range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start period of the range
        start: i64,
        /// End period of the range
        end: i64,
    },

    /// Referenced column is absent from the panel
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Column appears twice in the input header
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Panel has no rows or no period column
    #[error("Empty panel: {0}")]
    Empty(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
