#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/agora/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export sub-crates
pub use agora_data as data;
pub use agora_economy as economy;
pub use agora_formulation as formulation;

// Re-export common types
pub use agora_data::{AgentTable, DataOverride, Label, MatrixField, ProductTable};
pub use agora_economy::{Characteristics, Dimensions, Economy, EconomyError, ProductFormulations};
pub use agora_formulation::{Expr, Formulation};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use std::sync::Arc;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_facade_builds_economy() {
        let data = df!(
            "market_ids" => &[1i64, 1, 2],
            "prices" => &[1.0, 2.0, 3.0]
        )
        .unwrap();
        let x1 = Formulation::new([Expr::constant(1.0), Expr::var("prices")]);
        let products = ProductTable::builder(data.clone())
            .x1(x1.build_field(&data).unwrap())
            .build()
            .unwrap();
        let agents = AgentTable::builder(df!("market_ids" => &[1i64, 2]).unwrap())
            .build()
            .unwrap();
        let formulations = ProductFormulations::default().with_x1(Arc::new(x1));
        let economy = Economy::new(formulations, None, products, agents).unwrap();

        assert_eq!(economy.dimensions().k1, 2);
        assert_eq!(economy.max_j(), 2);
        assert!(economy.validate_name("prices").is_ok());
    }
}
