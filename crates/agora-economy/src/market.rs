//! Per-market views.

use agora_data::Label;
use ndarray::{Array2, Axis};

/// Read-only view of one market: its identifier and the rows it owns in
/// the product and agent tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Market<'a> {
    id: &'a Label,
    products: &'a [usize],
    agents: &'a [usize],
}

impl<'a> Market<'a> {
    pub(crate) const fn new(id: &'a Label, products: &'a [usize], agents: &'a [usize]) -> Self {
        Self {
            id,
            products,
            agents,
        }
    }

    /// Market identifier.
    pub const fn id(&self) -> &'a Label {
        self.id
    }

    /// Product row positions.
    pub const fn product_indices(&self) -> &'a [usize] {
        self.products
    }

    /// Agent row positions (empty if the agent table has no rows for this market).
    pub const fn agent_indices(&self) -> &'a [usize] {
        self.agents
    }

    /// Number of products in the market.
    pub const fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Number of agents in the market.
    pub const fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Rows of a product-aligned matrix belonging to this market.
    pub fn products_of(&self, matrix: &Array2<f64>) -> Array2<f64> {
        matrix.select(Axis(0), self.products)
    }

    /// Rows of an agent-aligned matrix belonging to this market.
    pub fn agents_of(&self, matrix: &Array2<f64>) -> Array2<f64> {
        matrix.select(Axis(0), self.agents)
    }
}
