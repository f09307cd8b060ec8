//! Fixed-effect absorption operators
//!
//! An absorption operator is bound once to the categorical identifier columns
//! of a table and may then be applied to any matrix that is row-aligned with
//! that table. Applying it returns the residual of the matrix after removing
//! the additive group structure implied by the identifiers.

use ndarray::Array2;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while binding or applying an absorption operator
#[derive(Debug, Error)]
pub enum AbsorbError {
    /// Matrix is not aligned with the identifiers the operator was bound to
    #[error("Dimension mismatch: expected {expected} rows, got {actual}")]
    DimensionMismatch {
        /// Rows of the bound identifier columns
        expected: usize,
        /// Rows of the supplied matrix
        actual: usize,
    },

    /// Iterative absorption failed to converge
    #[error("Absorption did not converge after {iterations} iterations (last change {change:e})")]
    NotConverged {
        /// Number of sweeps performed
        iterations: usize,
        /// Largest adjustment made in the final sweep
        change: f64,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Bound fixed-effect absorption operator.
pub trait Absorb: fmt::Debug + Send + Sync {
    /// Number of rows of the identifier columns the operator was bound to.
    fn rows(&self) -> usize;

    /// Number of categorical identifier dimensions.
    fn dimensions(&self) -> usize;

    /// Residualize a matrix with respect to the bound fixed effects.
    ///
    /// The input is left untouched and a matrix of the same shape is returned.
    fn absorb(&self, matrix: &Array2<f64>) -> Result<Array2<f64>, AbsorbError>;
}
