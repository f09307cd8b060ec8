//! Panel tables
//!
//! Each row of a panel table belongs to exactly one market. Tables carry
//! identifier columns, characteristic matrices with their attached column
//! formulas, and the raw variables those formulas are evaluated from.

pub mod agents;
pub mod matrix;
pub mod products;

pub use agents::{AgentTable, AgentTableBuilder};
pub use matrix::MatrixField;
pub use products::{ProductTable, ProductTableBuilder};

use crate::error::{DataError, Result};

/// Default name of the market identifier column.
pub const MARKET_IDS: &str = "market_ids";

/// Check that a field has the same number of rows as its table.
pub(crate) fn check_rows(field: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DataError::LengthMismatch {
            field: field.to_string(),
            expected,
            actual,
        })
    }
}
