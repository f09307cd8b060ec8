#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/agora/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod absorb;
pub mod error;
pub mod formula;
pub mod frame;
pub mod label;
pub mod overrides;
pub mod table;

pub use absorb::{Absorb, AbsorbError};
pub use error::{DataError, Result};
pub use formula::{ColumnFormula, ColumnValue, FormulaError, MatrixFormula, VariableSource};
pub use label::Label;
pub use overrides::DataOverride;
pub use table::{AgentTable, AgentTableBuilder, MatrixField, ProductTable, ProductTableBuilder};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
