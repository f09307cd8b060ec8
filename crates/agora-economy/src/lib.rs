#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/agora/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dimensions;
pub mod economy;
pub mod error;
pub mod market;
pub mod partition;

pub use dimensions::Dimensions;
pub use economy::{Characteristics, Economy, ProductFormulations};
pub use error::EconomyError;
pub use market::Market;
pub use partition::MarketPartition;
