//! Agent panel table.

use super::{MARKET_IDS, MatrixField, check_rows};
use crate::error::Result;
use crate::formula::{FormulaError, VariableSource};
use crate::frame::label_column;
use crate::label::Label;
use ndarray::Array1;
use polars::prelude::DataFrame;

/// Agent-side panel table (one row per simulated or observed agent per market).
#[derive(Debug, Clone)]
pub struct AgentTable {
    data: DataFrame,
    market_ids: Array1<Label>,
    demographics: MatrixField,
}

impl AgentTable {
    /// Start building a table over the raw agent variables in `data`.
    pub fn builder(data: DataFrame) -> AgentTableBuilder {
        AgentTableBuilder {
            data,
            market_ids: MARKET_IDS.to_string(),
            demographics: None,
        }
    }

    /// Raw agent variables.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Market identifier of every row.
    pub const fn market_ids(&self) -> &Array1<Label> {
        &self.market_ids
    }

    /// Demographic variables.
    pub const fn demographics(&self) -> &MatrixField {
        &self.demographics
    }
}

impl VariableSource for AgentTable {
    fn rows(&self) -> usize {
        self.market_ids.len()
    }

    fn variable(&self, name: &str) -> std::result::Result<Array1<f64>, FormulaError> {
        self.data.variable(name)
    }
}

/// Builder for [`AgentTable`].
#[derive(Debug)]
pub struct AgentTableBuilder {
    data: DataFrame,
    market_ids: String,
    demographics: Option<MatrixField>,
}

impl AgentTableBuilder {
    /// Column holding market identifiers (default `market_ids`).
    pub fn market_ids(mut self, column: impl Into<String>) -> Self {
        self.market_ids = column.into();
        self
    }

    /// Demographic variables.
    pub fn demographics(mut self, field: MatrixField) -> Self {
        self.demographics = Some(field);
        self
    }

    /// Read the market identifiers and check that demographics are row-aligned.
    pub fn build(self) -> Result<AgentTable> {
        let rows = self.data.height();
        let market_ids = label_column(&self.data, &self.market_ids)?;
        let demographics = self
            .demographics
            .unwrap_or_else(|| MatrixField::empty(rows));
        check_rows("demographics", rows, demographics.rows())?;

        Ok(AgentTable {
            data: self.data,
            market_ids,
            demographics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use polars::df;

    #[test]
    fn test_build_agents() {
        let data = df!("market_ids" => &["a", "b", "b"], "income" => &[1.0, 2.0, 3.0]).unwrap();
        let agents = AgentTable::builder(data).build().unwrap();
        assert_eq!(agents.rows(), 3);
        assert_eq!(agents.demographics().width(), 0);
        assert_eq!(agents.market_ids()[1], Label::from("b"));
    }

    #[test]
    fn test_misaligned_demographics() {
        let data = df!("market_ids" => &["a", "b"]).unwrap();
        let field = MatrixField::new(Array2::zeros((3, 0)), Vec::new());
        assert!(AgentTable::builder(data).demographics(field).build().is_err());
    }
}
