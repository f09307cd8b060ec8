//! Formula capability interface
//!
//! The economy never depends on concrete formula implementations. Anything
//! that can evaluate a column against a [`VariableSource`] under optional
//! [`DataOverride`]s and report the variable names it references is a
//! [`ColumnFormula`]. Matrix-level specifications that know how to bind a
//! fixed-effect absorption operator are [`MatrixFormula`]s.

use crate::absorb::{Absorb, AbsorbError};
use crate::label::Label;
use crate::overrides::DataOverride;
use ndarray::{Array1, ArrayView2};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Errors raised while evaluating formulas or binding absorption operators
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Variable not present in the data source
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Variable or result is not aligned with the data source rows
    #[error("Variable {name} has {actual} rows, expected {expected}")]
    LengthMismatch {
        /// Variable or column name
        name: String,
        /// Number of rows in the data source
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// Variable could not be read as numeric data
    #[error("Variable {name} is not numeric: {reason}")]
    NotNumeric {
        /// Variable name
        name: String,
        /// Underlying reason
        reason: String,
    },

    /// Absorption operator could not be bound
    #[error("Absorption error: {0}")]
    Absorb(#[from] AbsorbError),
}

/// Row-aligned source of raw variables.
pub trait VariableSource {
    /// Number of rows every variable is aligned with.
    fn rows(&self) -> usize;

    /// Read a variable by name as a column of length [`rows`](Self::rows).
    fn variable(&self, name: &str) -> Result<Array1<f64>, FormulaError>;
}

/// Value produced by evaluating a column formula.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// Row-invariant value, such as a constant term
    Scalar(f64),
    /// One value per row
    Column(Array1<f64>),
}

impl ColumnValue {
    /// Expand into a full column of `rows` values.
    ///
    /// Scalars are broadcast to every row; columns must already have `rows` values.
    pub fn into_column(self, rows: usize) -> Result<Array1<f64>, FormulaError> {
        match self {
            Self::Scalar(value) => Ok(Array1::from_elem(rows, value)),
            Self::Column(values) if values.len() == rows => Ok(values),
            Self::Column(values) => Err(FormulaError::LengthMismatch {
                name: "column".to_string(),
                expected: rows,
                actual: values.len(),
            }),
        }
    }
}

/// Symbolic description of how one column of a characteristic matrix is derived.
pub trait ColumnFormula: fmt::Display + fmt::Debug + Send + Sync {
    /// Variable names referenced by the formula.
    fn names(&self) -> &BTreeSet<String>;

    /// Evaluate the formula against a data source.
    ///
    /// Variables present in `overrides` take precedence over the source. Override
    /// entries for variables the formula does not reference are ignored.
    fn evaluate(
        &self,
        source: &dyn VariableSource,
        overrides: Option<&DataOverride>,
    ) -> Result<ColumnValue, FormulaError>;
}

/// Matrix-level formula specification able to bind fixed-effect absorption.
pub trait MatrixFormula: fmt::Debug + Send + Sync {
    /// Bind an absorption operator to categorical identifier columns.
    ///
    /// Implementations must only capture the grouping structure; absorption is
    /// applied later through [`Absorb::absorb`].
    fn build_absorb(&self, ids: ArrayView2<'_, Label>) -> Result<Box<dyn Absorb>, FormulaError>;
}

/// Read a variable, preferring an override when one is supplied.
///
/// Override values must be aligned with the source rows.
pub fn lookup_variable(
    source: &dyn VariableSource,
    overrides: Option<&DataOverride>,
    name: &str,
) -> Result<Array1<f64>, FormulaError> {
    match overrides.and_then(|o| o.get(name)) {
        Some(values) if values.len() != source.rows() => Err(FormulaError::LengthMismatch {
            name: name.to_string(),
            expected: source.rows(),
            actual: values.len(),
        }),
        Some(values) => Ok(values.clone()),
        None => source.variable(name),
    }
}
