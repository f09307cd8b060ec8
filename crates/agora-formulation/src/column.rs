//! Column formulations.

use crate::expr::Expr;
use agora_data::{ColumnFormula, ColumnValue, DataOverride, FormulaError, VariableSource};
use std::collections::BTreeSet;
use std::fmt;

/// One column of a characteristic matrix, described by an [`Expr`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFormulation {
    expression: Expr,
    names: BTreeSet<String>,
}

impl ColumnFormulation {
    /// Wrap an expression, recording the variables it references.
    pub fn new(expression: Expr) -> Self {
        let names = expression.names();
        Self { expression, names }
    }

    /// The underlying expression.
    pub const fn expression(&self) -> &Expr {
        &self.expression
    }
}

impl From<Expr> for ColumnFormulation {
    fn from(expression: Expr) -> Self {
        Self::new(expression)
    }
}

impl fmt::Display for ColumnFormulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

impl ColumnFormula for ColumnFormulation {
    fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    fn evaluate(
        &self,
        source: &dyn VariableSource,
        overrides: Option<&DataOverride>,
    ) -> Result<ColumnValue, FormulaError> {
        self.expression.evaluate(source, overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_recorded() {
        let column = ColumnFormulation::new(Expr::var("price") * Expr::var("x1"));
        assert_eq!(column.names().len(), 2);
        assert!(column.names().contains("x1"));
        assert_eq!(column.to_string(), "price * x1");
    }

    #[test]
    fn test_intercept_has_no_names() {
        let column = ColumnFormulation::from(Expr::constant(1.0));
        assert!(column.names().is_empty());
        assert_eq!(column.expression(), &Expr::Constant(1.0));
    }
}
