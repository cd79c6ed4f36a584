//! Error types for transactions2pln

use chrono::NaiveDate;
use thiserror::Error;

/// Main error type for transactions2pln
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Error reading from {source_name}: the file looks empty")]
    EmptyInput { source_name: String },

    #[error("Column not found: '{0}'")]
    ColumnNotFound(String),

    #[error("Invalid --{param} parameter: '{value}' does not match any column")]
    ColumnParameter { param: String, value: String },

    #[error("Table '{0}' is not published by the NBP")]
    UnknownTableGroup(String),

    #[error("Currency '{0}' does not appear in any NBP table")]
    UnknownCurrency(String),

    #[error("No row for date {date} in table {table}")]
    RateUnavailable { date: NaiveDate, table: String },

    #[error("Currency '{code}' was never listed in the header of table {table}")]
    MissingCurrencyPosition { code: String, table: String },

    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Error while processing row {row}: {cause}")]
    RowProcessing { row: usize, cause: RowFailure },

    #[error("Row has {cells} cells but the header has {labels} labels")]
    RowWidth { labels: usize, cells: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reason a single transaction row could not be converted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowFailure {
    #[error("value of column {column} does not match the format given in --date-format")]
    DateFormatMismatch { column: usize },

    #[error("--date-column was not given and no value matches the format given in --date-format")]
    NoDateFound,

    #[error("row has no column {column}")]
    MissingColumn { column: usize },

    #[error("{0}")]
    RateLookup(String),

    #[error("row has {cells} cells but the header has {labels} labels")]
    RowWidth { labels: usize, cells: usize },

    #[error("amount '{0}' is not a number")]
    InvalidAmount(String),

    #[error("amount {0} exceeds the precision of arithmetic operations")]
    AmountPrecisionExceeded(String),
}

impl ConversionError {
    /// Process exit status for this error.
    ///
    /// - `1`: uncategorized failure
    /// - `2`: environment, network or configuration failure
    /// - `3`: input or output file failure
    /// - `4`: column option failure
    /// - `5`: row processing failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ConversionError::Fetch(_) | ConversionError::Config(_) => 2,
            ConversionError::EmptyInput { .. }
            | ConversionError::RowWidth { .. }
            | ConversionError::Io(_)
            | ConversionError::Csv(_)
            | ConversionError::Json(_) => 3,
            ConversionError::ColumnParameter { .. } => 4,
            ConversionError::RowProcessing { .. } => 5,
            _ => 1,
        }
    }

    pub(crate) fn row(row: usize, cause: RowFailure) -> Self {
        ConversionError::RowProcessing { row, cause }
    }
}

/// Result type alias for transactions2pln operations
pub type Result<T> = std::result::Result<T, ConversionError>;
