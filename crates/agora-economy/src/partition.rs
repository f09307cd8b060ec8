//! Market partitioning
//!
//! A [`MarketPartition`] maps each distinct market identifier of a table to
//! the row positions carrying it. The partition never copies row data. Its
//! index sets are pairwise disjoint and together cover every row exactly once.

use agora_data::Label;
use ndarray::ArrayView1;
use std::collections::BTreeMap;

/// Row positions of a table grouped by market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketPartition {
    indices: BTreeMap<Label, Vec<usize>>,
    rows: usize,
    max_size: usize,
}

impl MarketPartition {
    /// Group row positions by market identifier in a single pass.
    pub fn new(market_ids: ArrayView1<'_, Label>) -> Self {
        let mut indices: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
        for (row, id) in market_ids.iter().enumerate() {
            indices.entry(id.clone()).or_default().push(row);
        }
        let max_size = indices.values().map(Vec::len).max().unwrap_or(0);

        Self {
            indices,
            rows: market_ids.len(),
            max_size,
        }
    }

    /// Row positions of a market, in ascending order.
    pub fn get(&self, market: &Label) -> Option<&[usize]> {
        self.indices.get(market).map(Vec::as_slice)
    }

    /// Stored identifier and row positions of a market.
    pub fn get_key_value(&self, market: &Label) -> Option<(&Label, &[usize])> {
        self.indices
            .get_key_value(market)
            .map(|(id, rows)| (id, rows.as_slice()))
    }

    /// Whether the market appears in the table.
    pub fn contains(&self, market: &Label) -> bool {
        self.indices.contains_key(market)
    }

    /// Distinct market identifiers, sorted.
    pub fn markets(&self) -> impl Iterator<Item = &Label> {
        self.indices.keys()
    }

    /// Markets with their row positions, sorted by identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, &[usize])> {
        self.indices.iter().map(|(id, rows)| (id, rows.as_slice()))
    }

    /// Number of distinct markets.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of rows covered by the partition.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Largest number of rows in any one market (0 for an empty table).
    pub const fn max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use rstest::rstest;

    fn partition(ids: &[i64]) -> MarketPartition {
        let ids = Array1::from_iter(ids.iter().map(|&id| Label::Int(id)));
        MarketPartition::new(ids.view())
    }

    #[rstest]
    #[case(&[1, 1, 1, 2, 2])]
    #[case(&[3, 1, 3, 2, 1, 3, 2])]
    #[case(&[7])]
    #[case(&[5, 4, 3, 2, 1])]
    #[case(&[])]
    fn test_disjoint_cover(#[case] ids: &[i64]) {
        let partition = partition(ids);
        let mut seen = vec![0usize; ids.len()];
        for (market, rows) in partition.iter() {
            for &row in rows {
                assert_eq!(Label::Int(ids[row]), *market);
                seen[row] += 1;
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
        assert_eq!(partition.rows(), ids.len());
    }

    #[test]
    fn test_sizes_and_max() {
        let partition = partition(&[1, 1, 1, 2, 2]);
        assert_eq!(partition.len(), 2);
        assert_eq!(partition.get(&Label::Int(1)), Some(&[0, 1, 2][..]));
        assert_eq!(partition.get(&Label::Int(2)), Some(&[3, 4][..]));
        assert_eq!(partition.max_size(), 3);
        assert!(partition.get(&Label::Int(9)).is_none());
    }

    #[test]
    fn test_sorted_iteration() {
        let partition = partition(&[3, 1, 2, 1]);
        let markets: Vec<_> = partition.markets().cloned().collect();
        assert_eq!(markets, vec![Label::Int(1), Label::Int(2), Label::Int(3)]);
        assert_eq!(partition.get(&Label::Int(1)), Some(&[1, 3][..]));
    }

    #[test]
    fn test_empty_table() {
        let partition = partition(&[]);
        assert!(partition.is_empty());
        assert_eq!(partition.max_size(), 0);
    }
}
