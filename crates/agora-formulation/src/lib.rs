#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/agora/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod absorb;
pub mod column;
pub mod expr;
pub mod formulation;

pub use absorb::{AbsorbConfig, FixedEffectAbsorber};
pub use column::ColumnFormulation;
pub use expr::Expr;
pub use formulation::Formulation;
