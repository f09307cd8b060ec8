//! Error types for panel table construction.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while building panel tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// Column missing from the underlying frame
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Identifier column contains a null
    #[error("Identifier column {column} contains a null at row {row}")]
    NullIdentifier {
        /// Column that was read
        column: String,
        /// First offending row
        row: usize,
    },

    /// Identifier column has a type that cannot be used as a label
    #[error("Identifier column {column} has unsupported type {dtype}")]
    UnsupportedIdentifier {
        /// Column that was read
        column: String,
        /// Data type of the column
        dtype: String,
    },

    /// Field is not row-aligned with its table
    #[error("Field {field} has {actual} rows, expected {expected}")]
    LengthMismatch {
        /// Field name
        field: String,
        /// Number of rows in the table
        expected: usize,
        /// Number of rows in the field
        actual: usize,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
