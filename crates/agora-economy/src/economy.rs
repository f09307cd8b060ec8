//! Economy
//!
//! The economy is constructed once per estimation problem by a sequential
//! pipeline:
//!
//! 1. dimension inference from the table shapes,
//! 2. market partitioning of the product and agent rows,
//! 3. extraction of the column formulations attached to each matrix field,
//! 4. binding of demand- and supply-side fixed-effect absorption operators.
//!
//! It is read-only afterward. Absorption operators are bound but never applied
//! to stored data; callers apply them explicitly to the matrices they need to
//! residualize.

use crate::dimensions::{Dimensions, unique_labels};
use crate::error::EconomyError;
use crate::market::Market;
use crate::partition::MarketPartition;
use agora_data::overrides::is_active;
use agora_data::{
    Absorb, AgentTable, ColumnFormula, DataOverride, FormulaError, Label, MatrixField,
    MatrixFormula, ProductTable,
};
use ndarray::{Array2, Axis};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Product-side formulation slots for linear, nonlinear and cost characteristics.
#[derive(Debug, Clone, Default)]
pub struct ProductFormulations {
    /// X1: linear characteristics (absorbs demand-side fixed effects)
    pub x1: Option<Arc<dyn MatrixFormula>>,
    /// X2: nonlinear characteristics
    pub x2: Option<Arc<dyn MatrixFormula>>,
    /// X3: cost characteristics (absorbs supply-side fixed effects)
    pub x3: Option<Arc<dyn MatrixFormula>>,
}

impl ProductFormulations {
    /// Set the X1 formulation.
    pub fn with_x1(mut self, formulation: Arc<dyn MatrixFormula>) -> Self {
        self.x1 = Some(formulation);
        self
    }

    /// Set the X2 formulation.
    pub fn with_x2(mut self, formulation: Arc<dyn MatrixFormula>) -> Self {
        self.x2 = Some(formulation);
        self
    }

    /// Set the X3 formulation.
    pub fn with_x3(mut self, formulation: Arc<dyn MatrixFormula>) -> Self {
        self.x3 = Some(formulation);
        self
    }
}

/// Characteristic matrices that can be recomputed from their formulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristics {
    /// X1, residualized by demand-side fixed effects
    Linear,
    /// X3, residualized by supply-side fixed effects
    Cost,
}

impl Characteristics {
    const fn field_name(self) -> &'static str {
        match self {
            Self::Linear => "X1",
            Self::Cost => "X3",
        }
    }
}

/// Panel economy underlying a demand estimation problem.
#[derive(Debug)]
pub struct Economy {
    product_formulations: ProductFormulations,
    agent_formulation: Option<Arc<dyn MatrixFormula>>,
    products: ProductTable,
    agents: AgentTable,
    unique_market_ids: Vec<Label>,
    unique_nesting_ids: Vec<Label>,
    dimensions: Dimensions,
    product_partition: MarketPartition,
    agent_partition: MarketPartition,
    x1_formulations: Vec<Arc<dyn ColumnFormula>>,
    x2_formulations: Vec<Arc<dyn ColumnFormula>>,
    x3_formulations: Vec<Arc<dyn ColumnFormula>>,
    demographics_formulations: Vec<Arc<dyn ColumnFormula>>,
    absorb_demand_ids: Option<Box<dyn Absorb>>,
    absorb_supply_ids: Option<Box<dyn Absorb>>,
}

impl Economy {
    /// Build an economy from formulations and panel tables.
    ///
    /// # Errors
    /// Fails if the number of column formulations attached to `X1`, `X2`, `X3` or
    /// the demographics differs from the field width, if fixed-effect identifiers
    /// are present without the formulation that absorbs them, or if an absorption
    /// operator cannot be bound.
    pub fn new(
        product_formulations: ProductFormulations,
        agent_formulation: Option<Arc<dyn MatrixFormula>>,
        products: ProductTable,
        agents: AgentTable,
    ) -> Result<Self, EconomyError> {
        let dimensions = Dimensions::infer(&products, &agents);

        let product_partition = MarketPartition::new(products.market_ids().view());
        let agent_partition = MarketPartition::new(agents.market_ids().view());
        log_unmatched_markets(&product_partition, &agent_partition);

        let unique_market_ids = product_partition.markets().cloned().collect();
        let unique_nesting_ids = products
            .nesting_ids()
            .map_or_else(Vec::new, |ids| unique_labels(ids.view()));

        let x1_formulations = extract_formulations("X1", products.x1())?;
        let x2_formulations = extract_formulations("X2", products.x2())?;
        let x3_formulations = extract_formulations("X3", products.x3())?;
        let demographics_formulations =
            extract_formulations("demographics", agents.demographics())?;

        let absorb_demand_ids = if dimensions.ed > 0 {
            let formulation = product_formulations
                .x1
                .as_ref()
                .ok_or(EconomyError::MissingFormulation {
                    side: "demand",
                    slot: "X1",
                })?;
            Some(formulation.build_absorb(products.demand_ids().view())?)
        } else {
            None
        };
        let absorb_supply_ids = if dimensions.es > 0 {
            let formulation = product_formulations
                .x3
                .as_ref()
                .ok_or(EconomyError::MissingFormulation {
                    side: "supply",
                    slot: "X3",
                })?;
            Some(formulation.build_absorb(products.supply_ids().view())?)
        } else {
            None
        };

        tracing::debug!(
            n = dimensions.n,
            t = dimensions.t,
            k1 = dimensions.k1,
            k2 = dimensions.k2,
            k3 = dimensions.k3,
            d = dimensions.d,
            ed = dimensions.ed,
            es = dimensions.es,
            h = dimensions.h,
            max_j = product_partition.max_size(),
            max_i = agent_partition.max_size(),
            "Constructed economy"
        );

        Ok(Self {
            product_formulations,
            agent_formulation,
            products,
            agents,
            unique_market_ids,
            unique_nesting_ids,
            dimensions,
            product_partition,
            agent_partition,
            x1_formulations,
            x2_formulations,
            x3_formulations,
            demographics_formulations,
            absorb_demand_ids,
            absorb_supply_ids,
        })
    }

    /// Scalar dimensions.
    pub const fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Product formulations the economy was built from.
    pub const fn product_formulations(&self) -> &ProductFormulations {
        &self.product_formulations
    }

    /// Agent formulation the economy was built from.
    pub fn agent_formulation(&self) -> Option<&dyn MatrixFormula> {
        self.agent_formulation.as_deref()
    }

    /// Product table.
    pub const fn products(&self) -> &ProductTable {
        &self.products
    }

    /// Agent table.
    pub const fn agents(&self) -> &AgentTable {
        &self.agents
    }

    /// Distinct product market identifiers, sorted.
    pub fn unique_market_ids(&self) -> &[Label] {
        &self.unique_market_ids
    }

    /// Distinct nesting identifiers, sorted (empty without nests).
    pub fn unique_nesting_ids(&self) -> &[Label] {
        &self.unique_nesting_ids
    }

    /// Product rows grouped by market.
    pub const fn product_partition(&self) -> &MarketPartition {
        &self.product_partition
    }

    /// Agent rows grouped by market.
    pub const fn agent_partition(&self) -> &MarketPartition {
        &self.agent_partition
    }

    /// Largest number of products in any market.
    pub const fn max_j(&self) -> usize {
        self.product_partition.max_size()
    }

    /// Largest number of agents in any market.
    pub const fn max_i(&self) -> usize {
        self.agent_partition.max_size()
    }

    /// View of one product market.
    pub fn market(&self, id: &Label) -> Option<Market<'_>> {
        let (id, products) = self.product_partition.get_key_value(id)?;
        Some(self.market_view(id, products))
    }

    /// Views of every product market, sorted by identifier.
    pub fn markets(&self) -> impl Iterator<Item = Market<'_>> {
        self.product_partition
            .iter()
            .map(|(id, products)| self.market_view(id, products))
    }

    fn market_view<'a>(&'a self, id: &'a Label, products: &'a [usize]) -> Market<'a> {
        Market::new(id, products, self.agent_partition.get(id).unwrap_or(&[]))
    }

    /// Column formulations of the linear characteristics.
    pub fn x1_formulations(&self) -> &[Arc<dyn ColumnFormula>] {
        &self.x1_formulations
    }

    /// Column formulations of the nonlinear characteristics.
    pub fn x2_formulations(&self) -> &[Arc<dyn ColumnFormula>] {
        &self.x2_formulations
    }

    /// Column formulations of the cost characteristics.
    pub fn x3_formulations(&self) -> &[Arc<dyn ColumnFormula>] {
        &self.x3_formulations
    }

    /// Column formulations of the demographics.
    pub fn demographics_formulations(&self) -> &[Arc<dyn ColumnFormula>] {
        &self.demographics_formulations
    }

    /// Demand-side absorption operator, bound to the demand identifiers.
    ///
    /// `None` when there are no demand-side fixed effects.
    pub fn absorb_demand_ids(&self) -> Option<&dyn Absorb> {
        self.absorb_demand_ids.as_deref()
    }

    /// Supply-side absorption operator, bound to the supply identifiers.
    ///
    /// `None` when there are no supply-side fixed effects.
    pub fn absorb_supply_ids(&self) -> Option<&dyn Absorb> {
        self.absorb_supply_ids.as_deref()
    }

    /// Recompute X1, or the columns of X1 selected by `mask`, without absorbed
    /// demand-side fixed effects.
    pub fn compute_true_x1(
        &self,
        overrides: Option<&DataOverride>,
        mask: Option<&[bool]>,
    ) -> Result<Array2<f64>, EconomyError> {
        self.recompute(Characteristics::Linear, overrides, mask)
    }

    /// Recompute X3, or the columns of X3 selected by `mask`, without absorbed
    /// supply-side fixed effects.
    pub fn compute_true_x3(
        &self,
        overrides: Option<&DataOverride>,
        mask: Option<&[bool]>,
    ) -> Result<Array2<f64>, EconomyError> {
        self.recompute(Characteristics::Cost, overrides, mask)
    }

    /// Recompute a characteristic matrix under optional overrides.
    ///
    /// Without fixed effects on that side and without an active override, the
    /// selected columns are read straight from the stored matrix. Otherwise each
    /// selected column is re-evaluated from its formulation against the product
    /// table, with row-invariant results broadcast to every row. Selected columns
    /// keep their left-to-right order. The result never reflects absorption.
    pub fn recompute(
        &self,
        characteristics: Characteristics,
        overrides: Option<&DataOverride>,
        mask: Option<&[bool]>,
    ) -> Result<Array2<f64>, EconomyError> {
        let (field, formulations, fixed_effects) = match characteristics {
            Characteristics::Linear => {
                (self.products.x1(), &self.x1_formulations, self.dimensions.ed)
            }
            Characteristics::Cost => {
                (self.products.x3(), &self.x3_formulations, self.dimensions.es)
            }
        };
        let selected = selected_columns(characteristics.field_name(), field.width(), mask)?;

        if fixed_effects == 0 && !is_active(overrides) {
            return Ok(field.values().select(Axis(1), &selected));
        }

        let n = self.dimensions.n;
        let mut matrix = Array2::<f64>::zeros((n, selected.len()));
        for (target, &source) in selected.iter().enumerate() {
            let formulation = &formulations[source];
            let column = formulation
                .evaluate(&self.products, overrides)?
                .into_column(n)
                .map_err(|e| match e {
                    FormulaError::LengthMismatch {
                        expected, actual, ..
                    } => FormulaError::LengthMismatch {
                        name: formulation.to_string(),
                        expected,
                        actual,
                    },
                    other => other,
                })?;
            matrix.column_mut(target).assign(&column);
        }

        Ok(matrix)
    }

    /// Variable names referenced by the X1, X2 and X3 formulations.
    pub fn variable_names(&self) -> BTreeSet<&str> {
        self.x1_formulations
            .iter()
            .chain(&self.x2_formulations)
            .chain(&self.x3_formulations)
            .flat_map(|f| f.names().iter().map(String::as_str))
            .collect()
    }

    /// Validate that a name is one of the underlying X1, X2 or X3 variables.
    pub fn validate_name(&self, name: &str) -> Result<(), EconomyError> {
        let names = self.variable_names();
        if names.contains(name) {
            return Ok(());
        }
        Err(EconomyError::NameNotFound {
            name: name.to_string(),
            valid: names.into_iter().map(str::to_string).collect(),
        })
    }

    /// Validate a firm IDs index, which must lie in `0..=F` for `F` firm ID columns.
    pub fn validate_firms_index(&self, index: i64) -> Result<(), EconomyError> {
        let max = self.products.firm_ids().ncols();
        if usize::try_from(index).is_ok_and(|i| i <= max) {
            Ok(())
        } else {
            Err(EconomyError::FirmsIndexOutOfBounds { index, max })
        }
    }
}

/// Clone the formulations attached to a field, checking they cover every column.
fn extract_formulations(
    field_name: &'static str,
    field: &MatrixField,
) -> Result<Vec<Arc<dyn ColumnFormula>>, EconomyError> {
    if field.formulations().len() != field.width() {
        return Err(EconomyError::FormulationMismatch {
            field: field_name,
            expected: field.width(),
            actual: field.formulations().len(),
        });
    }
    Ok(field.formulations().to_vec())
}

/// Positions of the selected columns, in order. No mask selects every column.
fn selected_columns(
    field_name: &'static str,
    width: usize,
    mask: Option<&[bool]>,
) -> Result<Vec<usize>, EconomyError> {
    match mask {
        None => Ok((0..width).collect()),
        Some(mask) if mask.len() == width => Ok(mask
            .iter()
            .enumerate()
            .filter_map(|(j, &include)| include.then_some(j))
            .collect()),
        Some(mask) => Err(EconomyError::MaskMismatch {
            field: field_name,
            expected: width,
            actual: mask.len(),
        }),
    }
}

fn log_unmatched_markets(products: &MarketPartition, agents: &MarketPartition) {
    let without_agents = products.markets().filter(|id| !agents.contains(id)).count();
    let without_products = agents.markets().filter(|id| !products.contains(id)).count();
    if without_agents > 0 || without_products > 0 {
        tracing::debug!(
            without_agents,
            without_products,
            "Product and agent market identifiers differ"
        );
    }
}
