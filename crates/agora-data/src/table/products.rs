//! Product panel table.

use super::{MARKET_IDS, MatrixField, check_rows};
use crate::error::Result;
use crate::formula::{FormulaError, VariableSource};
use crate::frame::{label_column, label_columns};
use crate::label::Label;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;

/// Product-side panel table (one row per product per market).
#[derive(Debug, Clone)]
pub struct ProductTable {
    data: DataFrame,
    market_ids: Array1<Label>,
    nesting_ids: Option<Array1<Label>>,
    firm_ids: Array2<Label>,
    demand_ids: Array2<Label>,
    supply_ids: Array2<Label>,
    x1: MatrixField,
    x2: MatrixField,
    x3: MatrixField,
    zd: Array2<f64>,
    zs: Array2<f64>,
}

impl ProductTable {
    /// Start building a table over the raw product variables in `data`.
    pub fn builder(data: DataFrame) -> ProductTableBuilder {
        ProductTableBuilder::new(data)
    }

    /// Raw product variables.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Market identifier of every row.
    pub const fn market_ids(&self) -> &Array1<Label> {
        &self.market_ids
    }

    /// Nesting identifier of every row, if products are nested.
    pub const fn nesting_ids(&self) -> Option<&Array1<Label>> {
        self.nesting_ids.as_ref()
    }

    /// Firm identifiers, one column per ownership configuration.
    pub const fn firm_ids(&self) -> &Array2<Label> {
        &self.firm_ids
    }

    /// Demand-side fixed-effect identifiers.
    pub const fn demand_ids(&self) -> &Array2<Label> {
        &self.demand_ids
    }

    /// Supply-side fixed-effect identifiers.
    pub const fn supply_ids(&self) -> &Array2<Label> {
        &self.supply_ids
    }

    /// Linear characteristics.
    pub const fn x1(&self) -> &MatrixField {
        &self.x1
    }

    /// Nonlinear characteristics.
    pub const fn x2(&self) -> &MatrixField {
        &self.x2
    }

    /// Cost characteristics.
    pub const fn x3(&self) -> &MatrixField {
        &self.x3
    }

    /// Demand-side instruments.
    pub const fn zd(&self) -> &Array2<f64> {
        &self.zd
    }

    /// Supply-side instruments.
    pub const fn zs(&self) -> &Array2<f64> {
        &self.zs
    }
}

impl VariableSource for ProductTable {
    fn rows(&self) -> usize {
        self.market_ids.len()
    }

    fn variable(&self, name: &str) -> std::result::Result<Array1<f64>, FormulaError> {
        self.data.variable(name)
    }
}

/// Builder for [`ProductTable`].
///
/// Identifier columns are named here and read from the frame in [`build`](Self::build).
/// Matrix fields not supplied are zero-width.
#[derive(Debug)]
pub struct ProductTableBuilder {
    data: DataFrame,
    market_ids: String,
    nesting_ids: Option<String>,
    firm_ids: Vec<String>,
    demand_ids: Vec<String>,
    supply_ids: Vec<String>,
    x1: Option<MatrixField>,
    x2: Option<MatrixField>,
    x3: Option<MatrixField>,
    zd: Option<Array2<f64>>,
    zs: Option<Array2<f64>>,
}

impl ProductTableBuilder {
    fn new(data: DataFrame) -> Self {
        Self {
            data,
            market_ids: MARKET_IDS.to_string(),
            nesting_ids: None,
            firm_ids: Vec::new(),
            demand_ids: Vec::new(),
            supply_ids: Vec::new(),
            x1: None,
            x2: None,
            x3: None,
            zd: None,
            zs: None,
        }
    }

    /// Column holding market identifiers (default `market_ids`).
    pub fn market_ids(mut self, column: impl Into<String>) -> Self {
        self.market_ids = column.into();
        self
    }

    /// Column holding nesting identifiers.
    pub fn nesting_ids(mut self, column: impl Into<String>) -> Self {
        self.nesting_ids = Some(column.into());
        self
    }

    /// Columns holding firm identifiers.
    pub fn firm_ids<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.firm_ids = to_owned(columns);
        self
    }

    /// Columns holding demand-side fixed-effect identifiers.
    pub fn demand_ids<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.demand_ids = to_owned(columns);
        self
    }

    /// Columns holding supply-side fixed-effect identifiers.
    pub fn supply_ids<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.supply_ids = to_owned(columns);
        self
    }

    /// Linear characteristics.
    pub fn x1(mut self, field: MatrixField) -> Self {
        self.x1 = Some(field);
        self
    }

    /// Nonlinear characteristics.
    pub fn x2(mut self, field: MatrixField) -> Self {
        self.x2 = Some(field);
        self
    }

    /// Cost characteristics.
    pub fn x3(mut self, field: MatrixField) -> Self {
        self.x3 = Some(field);
        self
    }

    /// Demand-side instruments.
    pub fn zd(mut self, instruments: Array2<f64>) -> Self {
        self.zd = Some(instruments);
        self
    }

    /// Supply-side instruments.
    pub fn zs(mut self, instruments: Array2<f64>) -> Self {
        self.zs = Some(instruments);
        self
    }

    /// Read identifier columns and check that every field is row-aligned.
    pub fn build(self) -> Result<ProductTable> {
        let n = self.data.height();

        let market_ids = label_column(&self.data, &self.market_ids)?;
        let nesting_ids = self
            .nesting_ids
            .as_deref()
            .map(|column| label_column(&self.data, column))
            .transpose()?;
        let firm_ids = label_columns(&self.data, &self.firm_ids)?;
        let demand_ids = label_columns(&self.data, &self.demand_ids)?;
        let supply_ids = label_columns(&self.data, &self.supply_ids)?;

        let x1 = self.x1.unwrap_or_else(|| MatrixField::empty(n));
        let x2 = self.x2.unwrap_or_else(|| MatrixField::empty(n));
        let x3 = self.x3.unwrap_or_else(|| MatrixField::empty(n));
        let zd = self.zd.unwrap_or_else(|| Array2::zeros((n, 0)));
        let zs = self.zs.unwrap_or_else(|| Array2::zeros((n, 0)));

        check_rows("X1", n, x1.rows())?;
        check_rows("X2", n, x2.rows())?;
        check_rows("X3", n, x3.rows())?;
        check_rows("ZD", n, zd.nrows())?;
        check_rows("ZS", n, zs.nrows())?;

        Ok(ProductTable {
            data: self.data,
            market_ids,
            nesting_ids,
            firm_ids,
            demand_ids,
            supply_ids,
            x1,
            x2,
            x3,
            zd,
            zs,
        })
    }
}

fn to_owned<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    columns.iter().map(|c| c.as_ref().to_string()).collect()
}
