//! Group demeaning by categorical identifiers.

use super::AbsorbConfig;
use agora_data::{Absorb, AbsorbError, Label};
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1};
use std::collections::HashMap;

/// Group codes for one identifier column.
#[derive(Debug, Clone)]
struct Grouping {
    /// Group index of every row
    codes: Vec<usize>,
    /// Number of rows in each group
    counts: Vec<usize>,
}

impl Grouping {
    fn new(ids: ArrayView1<'_, Label>) -> Self {
        let mut index: HashMap<&Label, usize> = HashMap::new();
        let mut counts = Vec::new();
        let codes = ids
            .iter()
            .map(|id| {
                let next = index.len();
                let code = *index.entry(id).or_insert(next);
                if code == counts.len() {
                    counts.push(0);
                }
                counts[code] += 1;
                code
            })
            .collect();

        Self { codes, counts }
    }

    /// Subtract group means in place, returning the largest absolute mean removed.
    fn demean(&self, mut column: ArrayViewMut1<'_, f64>) -> f64 {
        let mut means = vec![0.0; self.counts.len()];
        for (&code, &value) in self.codes.iter().zip(column.iter()) {
            means[code] += value;
        }
        for (mean, &count) in means.iter_mut().zip(&self.counts) {
            *mean /= count as f64;
        }
        for (&code, value) in self.codes.iter().zip(column.iter_mut()) {
            *value -= means[code];
        }

        means.iter().fold(0.0, |max, m| f64::max(max, m.abs()))
    }
}

/// Absorption operator bound to categorical identifier columns.
#[derive(Debug, Clone)]
pub struct FixedEffectAbsorber {
    config: AbsorbConfig,
    rows: usize,
    groupings: Vec<Grouping>,
}

impl FixedEffectAbsorber {
    /// Bind an absorber to identifier columns (rows x dimensions).
    pub fn new(ids: ArrayView2<'_, Label>, config: AbsorbConfig) -> Result<Self, AbsorbError> {
        if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
            return Err(AbsorbError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                config.tolerance
            )));
        }
        if config.max_iterations == 0 {
            return Err(AbsorbError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        let groupings: Vec<Grouping> = ids.columns().into_iter().map(Grouping::new).collect();
        tracing::debug!(
            rows = ids.nrows(),
            dimensions = groupings.len(),
            groups = ?groupings.iter().map(|g| g.counts.len()).collect::<Vec<_>>(),
            "Bound fixed-effect absorber"
        );

        Ok(Self {
            config,
            rows: ids.nrows(),
            groupings,
        })
    }

    /// Configuration used for iterative absorption.
    pub const fn config(&self) -> &AbsorbConfig {
        &self.config
    }

    /// Number of distinct groups in each identifier dimension.
    pub fn group_counts(&self) -> Vec<usize> {
        self.groupings.iter().map(|g| g.counts.len()).collect()
    }

    /// One demeaning pass over every dimension, returning the largest adjustment.
    fn sweep(&self, matrix: &mut Array2<f64>) -> f64 {
        let mut change = 0.0_f64;
        for grouping in &self.groupings {
            for column in matrix.columns_mut() {
                change = change.max(grouping.demean(column));
            }
        }
        change
    }
}

impl Absorb for FixedEffectAbsorber {
    fn rows(&self) -> usize {
        self.rows
    }

    fn dimensions(&self) -> usize {
        self.groupings.len()
    }

    fn absorb(&self, matrix: &Array2<f64>) -> Result<Array2<f64>, AbsorbError> {
        if matrix.nrows() != self.rows {
            return Err(AbsorbError::DimensionMismatch {
                expected: self.rows,
                actual: matrix.nrows(),
            });
        }

        let mut residual = matrix.clone();
        match self.groupings.len() {
            0 => return Ok(residual),
            1 => {
                self.sweep(&mut residual);
                return Ok(residual);
            }
            _ => {}
        }

        let scale = matrix.iter().fold(1.0_f64, |max, v| max.max(v.abs()));
        let threshold = self.config.tolerance * scale;
        let mut change = f64::INFINITY;
        for iteration in 1..=self.config.max_iterations {
            change = self.sweep(&mut residual);
            if change <= threshold {
                tracing::debug!(iterations = iteration, change, "Absorbed fixed effects");
                return Ok(residual);
            }
        }

        Err(AbsorbError::NotConverged {
            iterations: self.config.max_iterations,
            change,
        })
    }
}
