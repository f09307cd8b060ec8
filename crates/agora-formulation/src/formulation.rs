//! Matrix formulations
//!
//! A [`Formulation`] is an ordered set of column formulations together with
//! the identifier columns whose fixed effects should be absorbed from the
//! resulting matrix. It produces the [`MatrixField`]s stored in panel tables
//! and binds absorption operators for the economy.

use crate::absorb::{AbsorbConfig, FixedEffectAbsorber};
use crate::column::ColumnFormulation;
use crate::expr::Expr;
use agora_data::{
    Absorb, ColumnFormula, FormulaError, Label, MatrixField, MatrixFormula, VariableSource,
};
use ndarray::{Array2, ArrayView2};
use std::fmt;
use std::sync::Arc;

/// Ordered column formulations for one characteristic matrix.
#[derive(Debug, Clone, Default)]
pub struct Formulation {
    columns: Vec<Arc<ColumnFormulation>>,
    absorb: Vec<String>,
    absorb_config: AbsorbConfig,
}

impl Formulation {
    /// Create a formulation with one column per expression.
    pub fn new(columns: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|expr| Arc::new(ColumnFormulation::new(expr)))
                .collect(),
            ..Default::default()
        }
    }

    /// Name the identifier columns whose fixed effects are absorbed.
    ///
    /// The names are descriptive only. The economy binds absorption to the
    /// `demand_ids`/`supply_ids` columns of its product table and never reads
    /// these names, so callers keep the two in agreement, for example by
    /// passing [`absorb_columns`](Self::absorb_columns) to the table builder.
    pub fn with_absorb<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.absorb = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Configure iterative absorption.
    pub fn with_absorb_config(mut self, config: AbsorbConfig) -> Self {
        self.absorb_config = config;
        self
    }

    /// Column formulations, in column order.
    pub fn columns(&self) -> &[Arc<ColumnFormulation>] {
        &self.columns
    }

    /// Identifier columns whose fixed effects are absorbed.
    pub fn absorb_columns(&self) -> &[String] {
        &self.absorb
    }

    /// Absorption configuration.
    pub const fn absorb_config(&self) -> &AbsorbConfig {
        &self.absorb_config
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the formulation has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Evaluate every column against `source` and attach the column formulations.
    ///
    /// Row-invariant columns, such as an intercept, are broadcast to every row.
    pub fn build_field(&self, source: &dyn VariableSource) -> Result<MatrixField, FormulaError> {
        let rows = source.rows();
        let mut values = Array2::<f64>::zeros((rows, self.columns.len()));
        for (j, column) in self.columns.iter().enumerate() {
            let evaluated = column.evaluate(source, None)?.into_column(rows)?;
            values.column_mut(j).assign(&evaluated);
        }

        let formulations = self
            .columns
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn ColumnFormula>)
            .collect();

        Ok(MatrixField::new(values, formulations))
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", terms.join(" + "))?;
        if !self.absorb.is_empty() {
            write!(f, " | absorb {}", self.absorb.join(" + "))?;
        }
        Ok(())
    }
}

impl MatrixFormula for Formulation {
    fn build_absorb(&self, ids: ArrayView2<'_, Label>) -> Result<Box<dyn Absorb>, FormulaError> {
        let absorber = FixedEffectAbsorber::new(ids, self.absorb_config.clone())?;
        Ok(Box::new(absorber))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};
    use polars::df;
    use polars::prelude::DataFrame;

    fn frame() -> DataFrame {
        df!("price" => &[1.0, 2.0, 3.0], "x" => &[4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn test_build_field_broadcasts_intercept() {
        let formulation = Formulation::new([Expr::constant(1.0), Expr::var("price"), Expr::var("x")]);
        let field = formulation.build_field(&frame()).unwrap();

        assert_eq!(field.values().dim(), (3, 3));
        assert_eq!(field.formulations().len(), 3);
        assert_eq!(field.values().column(0), Array1::from_elem(3, 1.0));
        assert_relative_eq!(field.values()[[2, 1]], 3.0);
        assert_relative_eq!(field.values()[[0, 2]], 4.0);
        assert_eq!(field.formulations()[1].to_string(), "price");
    }

    #[test]
    fn test_build_field_unknown_variable() {
        let formulation = Formulation::new([Expr::var("bogus")]);
        assert!(matches!(
            formulation.build_field(&frame()),
            Err(FormulaError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_display() {
        let formulation =
            Formulation::new([Expr::constant(1.0), Expr::var("price")]).with_absorb(&["product_ids"]);
        assert_eq!(formulation.to_string(), "1 + price | absorb product_ids");
        assert_eq!(formulation.absorb_columns(), &["product_ids".to_string()]);
    }

    #[test]
    fn test_build_absorb_binds_without_applying() {
        let formulation = Formulation::new([Expr::var("price")]).with_absorb(&["product_ids"]);
        let ids = array![[Label::Int(1)], [Label::Int(1)], [Label::Int(2)]];
        let absorb = formulation.build_absorb(ids.view()).unwrap();
        assert_eq!(absorb.rows(), 3);
        assert_eq!(absorb.dimensions(), 1);

        let residual = absorb.absorb(&array![[1.0], [3.0], [5.0]]).unwrap();
        assert_relative_eq!(residual[[0, 0]], -1.0, epsilon = 1e-12);
        assert_relative_eq!(residual[[2, 0]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_build_absorb_uses_supplied_ids_not_names() {
        // Named dimension count differs from the identifiers actually supplied
        let formulation = Formulation::new([Expr::var("price")]).with_absorb(&["not_a_column"]);
        let ids = array![
            [Label::Int(1), Label::from("a")],
            [Label::Int(2), Label::from("a")],
            [Label::Int(2), Label::from("b")]
        ];
        let absorb = formulation.build_absorb(ids.view()).unwrap();
        assert_eq!(absorb.dimensions(), 2);
        assert_eq!(formulation.absorb_columns(), &["not_a_column".to_string()]);
    }

    #[test]
    fn test_build_absorb_propagates_config_errors() {
        let formulation = Formulation::new([Expr::var("price")]).with_absorb_config(AbsorbConfig {
            max_iterations: 0,
            ..Default::default()
        });
        let ids = array![[Label::Int(1)]];
        assert!(matches!(
            formulation.build_absorb(ids.view()),
            Err(FormulaError::Absorb(_))
        ));
    }
}
