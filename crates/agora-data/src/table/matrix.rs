//! Matrix-valued table fields.

use crate::formula::ColumnFormula;
use ndarray::Array2;
use std::sync::Arc;

/// A named matrix field: ordered sub-columns with one attached formula each.
///
/// The field does not enforce that the number of formulas matches the number
/// of columns. That contract belongs to the formula component that produced
/// the field and is checked by consumers that rely on it.
#[derive(Debug, Clone)]
pub struct MatrixField {
    values: Array2<f64>,
    formulations: Vec<Arc<dyn ColumnFormula>>,
}

impl MatrixField {
    /// Create a field from its values and the formulas that produced each column.
    pub const fn new(values: Array2<f64>, formulations: Vec<Arc<dyn ColumnFormula>>) -> Self {
        Self {
            values,
            formulations,
        }
    }

    /// Zero-width field with `rows` rows.
    pub fn empty(rows: usize) -> Self {
        Self::new(Array2::zeros((rows, 0)), Vec::new())
    }

    /// Stored column values (rows x width).
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Column formulas, in column order.
    pub fn formulations(&self) -> &[Arc<dyn ColumnFormula>] {
        &self.formulations
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.values.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field() {
        let field = MatrixField::empty(4);
        assert_eq!(field.rows(), 4);
        assert_eq!(field.width(), 0);
        assert!(field.formulations().is_empty());
    }
}
