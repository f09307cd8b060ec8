//! Opaque identifiers for markets, nests, firms and fixed-effect groups.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Identifier value read from an identifier column.
///
/// Grouping only ever compares labels by equality. The derived ordering
/// (integers before strings) exists so that collections of distinct labels
/// iterate deterministically.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[serde(untagged)]
pub enum Label {
    /// Integer identifier
    #[display("{_0}")]
    Int(i64),

    /// String identifier
    #[display("{_0}")]
    Str(String),
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}
