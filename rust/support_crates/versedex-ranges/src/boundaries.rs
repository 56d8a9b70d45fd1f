//! Structural extents used to clamp [`ReferenceSet::blur`](crate::ReferenceSet::blur).

use std::ops::Range;

/// Maps an ordinal to the structural extent (e.g. the chapter) containing it.
///
/// Extents partition the ordinal space into consecutive half-open ranges.
/// An ordinal outside every known extent is its own extent, `o..o + 1`,
/// so blurring never moves it.
pub trait Boundaries: Send + Sync {
    fn extent_of(&self, ordinal: u32) -> Range<u32>;
}

/// A single extent covering the whole corpus: blurring is only clamped at the
/// corpus edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unrestricted {
    universe: Range<u32>,
}

impl Unrestricted {
    /// Corpus of `unit_count` units with ordinals `1..=unit_count`.
    pub fn new(unit_count: u32) -> Unrestricted {
        Unrestricted {
            universe: 1..unit_count.saturating_add(1),
        }
    }

    pub fn universe(&self) -> Range<u32> {
        self.universe.clone()
    }
}

impl Boundaries for Unrestricted {
    fn extent_of(&self, ordinal: u32) -> Range<u32> {
        if self.universe.contains(&ordinal) {
            self.universe.clone()
        } else {
            ordinal..ordinal.saturating_add(1)
        }
    }
}

/// Extents given by a sorted table of start ordinals.
///
/// `starts[i]..starts[i + 1]` is extent `i`; the last extent ends at `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryTable {
    starts: Vec<u32>,
    end: u32,
}

impl BoundaryTable {
    /// Builds the table for ordinals `1..=unit_count`, where `boundary_id`
    /// names the structural unit of each ordinal. Consecutive ordinals with
    /// equal ids form one extent.
    pub fn from_fn<T, F>(unit_count: u32, mut boundary_id: F) -> BoundaryTable
    where
        T: PartialEq,
        F: FnMut(u32) -> T,
    {
        let mut starts = Vec::new();
        let mut previous: Option<T> = None;
        for ordinal in 1..=unit_count {
            let id = boundary_id(ordinal);
            if previous.as_ref() != Some(&id) {
                starts.push(ordinal);
            }
            previous = Some(id);
        }
        BoundaryTable {
            starts,
            end: unit_count.saturating_add(1),
        }
    }

    /// Number of extents.
    pub fn boundary_count(&self) -> usize {
        self.starts.len()
    }

    pub fn extents(&self) -> impl Iterator<Item = Range<u32>> + '_ {
        self.starts
            .iter()
            .enumerate()
            .map(|(i, &start)| start..self.starts.get(i + 1).copied().unwrap_or(self.end))
    }
}

impl Boundaries for BoundaryTable {
    fn extent_of(&self, ordinal: u32) -> Range<u32> {
        let first = self.starts.first().copied().unwrap_or(self.end);
        if ordinal < first || ordinal >= self.end {
            return ordinal..ordinal.saturating_add(1);
        }
        let idx = self.starts.partition_point(|&s| s <= ordinal) - 1;
        let end = self.starts.get(idx + 1).copied().unwrap_or(self.end);
        self.starts[idx]..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted() {
        let b = Unrestricted::new(10);
        assert_eq!(b.extent_of(1), 1..11);
        assert_eq!(b.extent_of(10), 1..11);
        assert_eq!(b.extent_of(0), 0..1);
        assert_eq!(b.extent_of(11), 11..12);
    }

    #[test]
    fn test_table_from_ids() {
        let chapters = ["a", "a", "b", "b", "b", "c", "a"];
        let table = BoundaryTable::from_fn(7, |o| chapters[o as usize - 1]);
        assert_eq!(table.boundary_count(), 4);
        assert_eq!(
            table.extents().collect::<Vec<_>>(),
            vec![1..3, 3..6, 6..7, 7..8]
        );
        assert_eq!(table.extent_of(1), 1..3);
        assert_eq!(table.extent_of(2), 1..3);
        assert_eq!(table.extent_of(4), 3..6);
        assert_eq!(table.extent_of(7), 7..8);
        // Out of range ordinals are their own extent.
        assert_eq!(table.extent_of(0), 0..1);
        assert_eq!(table.extent_of(9), 9..10);
    }

    #[test]
    fn test_empty_table() {
        let table = BoundaryTable::from_fn(0, |_| 0);
        assert_eq!(table.boundary_count(), 0);
        assert_eq!(table.extent_of(1), 1..2);
    }
}
