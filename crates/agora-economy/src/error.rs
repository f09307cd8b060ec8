//! Economy errors.

use agora_data::FormulaError;
use thiserror::Error;

/// Errors raised while constructing or querying an [`Economy`](crate::Economy)
#[derive(Debug, Error)]
pub enum EconomyError {
    /// Number of column formulations attached to a field differs from its width
    #[error("{field} has {actual} column formulations, expected {expected}")]
    FormulationMismatch {
        /// Matrix field name
        field: &'static str,
        /// Width of the field
        expected: usize,
        /// Number of attached formulations
        actual: usize,
    },

    /// Fixed effects are present but the formulation that absorbs them is missing
    #[error("{side}-side fixed effects require the {slot} product formulation")]
    MissingFormulation {
        /// Demand or supply
        side: &'static str,
        /// Product formulation slot that is empty
        slot: &'static str,
    },

    /// Name is not used by any X1, X2 or X3 formulation
    #[error("The name '{name}' is not one of the underlying variables, {valid:?}.")]
    NameNotFound {
        /// Name that was looked up
        name: String,
        /// All valid variable names, sorted
        valid: Vec<String>,
    },

    /// Firm IDs index outside of the valid range
    #[error("firms_index must be an int between 0 and {max}, got {index}.")]
    FirmsIndexOutOfBounds {
        /// Index that was supplied
        index: i64,
        /// Largest valid index (inclusive)
        max: usize,
    },

    /// Column mask does not match the width of the matrix
    #[error("Column mask for {field} has {actual} entries, expected {expected}")]
    MaskMismatch {
        /// Matrix field name
        field: &'static str,
        /// Width of the field
        expected: usize,
        /// Length of the mask
        actual: usize,
    },

    /// Formula evaluation or absorption binding failed
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),
}
