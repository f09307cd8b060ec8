//! Fixed-effect absorption
//!
//! A [`FixedEffectAbsorber`] captures the grouping structure of one or more
//! categorical identifier columns once, and can then residualize any
//! row-aligned matrix against those groups.
//!
//! With a single identifier column the residual is exact after one sweep of
//! group demeaning. With several columns the absorber alternates projections,
//! demeaning by each dimension in turn until the largest group-mean adjustment
//! in a sweep falls below `tolerance * max(1, max|x|)`.

pub mod demean;

pub use demean::FixedEffectAbsorber;

use serde::{Deserialize, Serialize};

/// Fixed-effect absorption configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsorbConfig {
    /// Convergence tolerance for alternating projections (default: 1e-12)
    /// Scaled by the largest absolute entry of the absorbed matrix
    pub tolerance: f64,

    /// Maximum number of sweeps before giving up (default: 1000)
    pub max_iterations: usize,
}

impl Default for AbsorbConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 1_000,
        }
    }
}
