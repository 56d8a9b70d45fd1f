use std::collections::BTreeMap;

use versedex_ranges::ReferenceSet;

/// Per-unit hit counts of a best-match search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    hits: BTreeMap<u32, u32>,
}

impl Tally {
    pub fn new() -> Tally {
        Tally::default()
    }

    /// Counts one hit for every unit of `set`.
    pub fn add_set(&mut self, set: &ReferenceSet) {
        for unit in set {
            *self.hits.entry(unit).or_insert(0) += 1;
        }
    }

    pub fn hits(&self, unit: u32) -> u32 {
        self.hits.get(&unit).copied().unwrap_or(0)
    }

    /// Number of units with at least one hit.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Units with at least one hit.
    pub fn units(&self) -> ReferenceSet {
        self.hits.keys().copied().collect()
    }

    /// Units ordered by descending hits, ties by ascending ordinal, at most
    /// `limit` of them.
    pub fn ranked(&self, limit: usize) -> Vec<(u32, u32)> {
        let mut ranked: Vec<(u32, u32)> = self.hits.iter().map(|(&u, &h)| (u, h)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking() {
        let mut tally = Tally::new();
        tally.add_set(&ReferenceSet::from_iter([1, 2, 3]));
        tally.add_set(&ReferenceSet::from_iter([3, 7]));
        tally.add_set(&ReferenceSet::from_iter([7, 9]));

        assert_eq!(tally.hits(3), 2);
        assert_eq!(tally.hits(4), 0);
        assert_eq!(tally.len(), 5);
        assert_eq!(tally.ranked(3), vec![(3, 2), (7, 2), (1, 1)]);
        assert_eq!(tally.ranked(100).len(), 5);
        assert_eq!(tally.units().to_string(), "1-3, 7, 9");
    }
}
