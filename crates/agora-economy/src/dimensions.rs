//! Problem dimensions
//!
//! All scalar counts are read from column widths of the panel tables and from
//! distinct values of the market and nesting identifier columns.

use agora_data::{AgentTable, Label, ProductTable};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scalar dimensions of an economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Dimensions {
    /// Number of product rows
    pub n: usize,
    /// Number of markets
    pub t: usize,
    /// Number of linear characteristics
    pub k1: usize,
    /// Number of nonlinear characteristics
    pub k2: usize,
    /// Number of cost characteristics
    pub k3: usize,
    /// Number of demographic variables
    pub d: usize,
    /// Number of demand-side instruments
    pub md: usize,
    /// Number of supply-side instruments
    pub ms: usize,
    /// Number of demand-side fixed-effect dimensions
    pub ed: usize,
    /// Number of supply-side fixed-effect dimensions
    pub es: usize,
    /// Number of nests
    pub h: usize,
}

impl Dimensions {
    /// Infer dimensions from well-formed product and agent tables.
    pub fn infer(products: &ProductTable, agents: &AgentTable) -> Self {
        Self {
            n: products.market_ids().len(),
            t: unique_labels(products.market_ids().view()).len(),
            k1: products.x1().width(),
            k2: products.x2().width(),
            k3: products.x3().width(),
            d: agents.demographics().width(),
            md: products.zd().ncols(),
            ms: products.zs().ncols(),
            ed: products.demand_ids().ncols(),
            es: products.supply_ids().ncols(),
            h: products
                .nesting_ids()
                .map_or(0, |ids| unique_labels(ids.view()).len()),
        }
    }
}

/// Sorted distinct labels.
pub fn unique_labels(ids: ArrayView1<'_, Label>) -> Vec<Label> {
    ids.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_unique_labels_sorted() {
        let ids = array![Label::from("b"), Label::from("a"), Label::from("b")];
        assert_eq!(unique_labels(ids.view()), vec![Label::from("a"), Label::from("b")]);
    }

    #[test]
    fn test_serialize_uppercase() {
        let dimensions = Dimensions {
            n: 5,
            t: 2,
            ..Default::default()
        };
        let json = serde_json::to_value(dimensions).unwrap();
        assert_eq!(json["N"], 5);
        assert_eq!(json["T"], 2);
        assert_eq!(json["ED"], 0);
    }
}
