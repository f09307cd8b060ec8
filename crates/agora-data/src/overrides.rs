//! Data overrides
//!
//! A [`DataOverride`] substitutes one or more named variables with caller-supplied
//! values when a column formula is evaluated. Overrides power counterfactual
//! scenarios and finite-difference derivatives without touching stored data.

use ndarray::Array1;
use std::collections::BTreeMap;

/// Replacement values for named variables, aligned with table rows.
///
/// An empty override behaves exactly like no override at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataOverride {
    values: BTreeMap<String, Array1<f64>>,
}

impl DataOverride {
    /// Create an empty override.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Add a replacement for a variable, returning the override for chaining.
    pub fn with(mut self, name: impl Into<String>, values: Array1<f64>) -> Self {
        self.insert(name, values);
        self
    }

    /// Insert a replacement for a variable, returning any previous replacement.
    pub fn insert(&mut self, name: impl Into<String>, values: Array1<f64>) -> Option<Array1<f64>> {
        self.values.insert(name.into(), values)
    }

    /// Replacement values for a variable, if any.
    pub fn get(&self, name: &str) -> Option<&Array1<f64>> {
        self.values.get(name)
    }

    /// Whether no variable is overridden.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of overridden variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Names of the overridden variables, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, Array1<f64>)> for DataOverride {
    fn from_iter<I: IntoIterator<Item = (S, Array1<f64>)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, values)| (name.into(), values))
                .collect(),
        }
    }
}

/// Whether an optional override actually replaces anything.
pub fn is_active(overrides: Option<&DataOverride>) -> bool {
    overrides.is_some_and(|o| !o.is_empty())
}
