//! An ordered, deduplicated set of corpus ordinals stored as ranges.

use std::{fmt, iter::FusedIterator, ops::Range};

use crate::{
    MAX_ORDINAL,
    boundaries::Boundaries,
    set_ops::{self, push_coalesced},
};

/// A set of ordinals represented as a sorted list of half-open ranges.
///
/// `ReferenceSet` is the result of every word lookup and every query step. It
/// is small for the two shapes that dominate a text index: long contiguous
/// runs (a word present in every unit of a chapter) and sparse scattered hits.
///
/// Invariants:
/// - Ranges are non-empty and sorted ascending by `start`.
/// - No two ranges overlap or touch: `ranges[i].end < ranges[i + 1].start`.
/// - The empty set is the empty range list.
///
/// Because of these invariants two sets are equal exactly when their range
/// lists are equal, so `PartialEq` is derived.
///
/// Complexity overview (`R` = number of ranges):
/// - `contains`: O(log R)
/// - `add`: O(log R) lookup; appending in ascending order is O(1) amortized
/// - `add_all` / `retain_all` / `remove_all`: O(R1 + R2) merge-join
/// - `blur`: O(R · log B) where `B` is the number of boundary extents
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ReferenceSet {
    ranges: Vec<Range<u32>>,
}

impl ReferenceSet {
    /// Creates an empty set.
    pub fn new() -> ReferenceSet {
        ReferenceSet { ranges: Vec::new() }
    }

    /// Creates a set holding a single ordinal.
    ///
    /// # Panics
    ///
    /// Panics if `unit` exceeds [`MAX_ORDINAL`].
    pub fn single(unit: u32) -> ReferenceSet {
        let mut set = ReferenceSet::new();
        set.add(unit);
        set
    }

    /// Creates a set from arbitrary ranges, in any order, possibly overlapping.
    /// Empty ranges are ignored.
    pub fn from_ranges<I>(ranges: I) -> ReferenceSet
    where
        I: IntoIterator<Item = Range<u32>>,
    {
        let mut ranges: Vec<Range<u32>> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
        ranges.sort_unstable_by_key(|r| r.start);

        let mut normalized = Vec::with_capacity(ranges.len());
        for range in ranges {
            push_coalesced(&mut normalized, range);
        }
        ReferenceSet { ranges: normalized }
    }

    /// Wraps a range list that is already normalized.
    pub(crate) fn from_normalized(ranges: Vec<Range<u32>>) -> ReferenceSet {
        debug_assert!(is_normalized(&ranges));
        ReferenceSet { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of ordinals in the set.
    pub fn len(&self) -> u64 {
        self.ranges.iter().map(|r| (r.end - r.start) as u64).sum()
    }

    /// Number of maximal contiguous ranges in the set.
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// The normalized ranges of this set.
    pub fn ranges(&self) -> &[Range<u32>] {
        &self.ranges
    }

    pub fn first(&self) -> Option<u32> {
        self.ranges.first().map(|r| r.start)
    }

    pub fn last(&self) -> Option<u32> {
        self.ranges.last().map(|r| r.end - 1)
    }

    pub fn contains(&self, unit: u32) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= unit);
        self.ranges.get(idx).is_some_and(|r| r.start <= unit)
    }

    /// Iterates over the individual ordinals in ascending order.
    pub fn iter(&self) -> Units<'_> {
        Units {
            ranges: self.ranges.iter(),
            current: 0..0,
        }
    }

    /// Adds a single ordinal, merging it with its neighbours when they touch.
    ///
    /// # Panics
    ///
    /// Panics if `unit` exceeds [`MAX_ORDINAL`].
    pub fn add(&mut self, unit: u32) {
        assert!(unit <= MAX_ORDINAL, "ordinal {unit} out of range");

        // Builders add ordinals in ascending order: extend or append at the tail.
        match self.ranges.last_mut() {
            None => {
                self.ranges.push(unit..unit + 1);
                return;
            }
            Some(last) if unit >= last.start => {
                if unit == last.end {
                    last.end += 1;
                } else if unit > last.end {
                    self.ranges.push(unit..unit + 1);
                }
                return;
            }
            Some(_) => {}
        }

        let idx = self.ranges.partition_point(|r| r.start <= unit);
        if idx > 0 {
            let prev = &mut self.ranges[idx - 1];
            if unit < prev.end {
                return;
            }
            if unit == prev.end {
                prev.end += 1;
                if self.ranges[idx].start == self.ranges[idx - 1].end {
                    let next = self.ranges.remove(idx);
                    self.ranges[idx - 1].end = next.end;
                }
                return;
            }
        }

        // `idx < len` here: the tail case was handled above.
        if self.ranges[idx].start == unit + 1 {
            self.ranges[idx].start = unit;
        } else {
            self.ranges.insert(idx, unit..unit + 1);
        }
    }

    /// Adds every ordinal of `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range.end` exceeds `MAX_ORDINAL + 1`.
    pub fn add_range(&mut self, range: Range<u32>) {
        if range.is_empty() {
            return;
        }
        assert!(range.end - 1 <= MAX_ORDINAL, "range {range:?} out of bounds");
        if self.ranges.last().is_none_or(|last| range.start >= last.start) {
            push_coalesced(&mut self.ranges, range);
            return;
        }
        self.ranges = set_ops::union(self.ranges.iter().cloned(), std::iter::once(range)).collect();
    }

    /// Removes a single ordinal, splitting its range when needed.
    pub fn remove(&mut self, unit: u32) {
        let idx = self.ranges.partition_point(|r| r.end <= unit);
        let Some(range) = self.ranges.get(idx).cloned() else {
            return;
        };
        if unit < range.start {
            return;
        }
        match (unit == range.start, unit + 1 == range.end) {
            (true, true) => {
                self.ranges.remove(idx);
            }
            (true, false) => self.ranges[idx].start += 1,
            (false, true) => self.ranges[idx].end -= 1,
            (false, false) => {
                self.ranges[idx].end = unit;
                self.ranges.insert(idx + 1, unit + 1..range.end);
            }
        }
    }

    /// Set union: adds every ordinal of `other` to this set.
    pub fn add_all(&mut self, other: &ReferenceSet) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.ranges = other.ranges.clone();
            return;
        }
        self.ranges =
            set_ops::union(self.ranges.iter().cloned(), other.ranges.iter().cloned()).collect();
    }

    /// Set intersection: keeps only the ordinals also present in `other`.
    pub fn retain_all(&mut self, other: &ReferenceSet) {
        if self.is_empty() {
            return;
        }
        if other.is_empty() {
            self.ranges.clear();
            return;
        }
        self.ranges =
            set_ops::intersection(self.ranges.iter().cloned(), other.ranges.iter().cloned())
                .collect();
    }

    /// Set difference: removes every ordinal present in `other`.
    pub fn remove_all(&mut self, other: &ReferenceSet) {
        if self.is_empty() || other.is_empty() {
            return;
        }
        self.ranges =
            set_ops::difference(self.ranges.iter().cloned(), other.ranges.iter().cloned())
                .collect();
    }

    pub fn union(&self, other: &ReferenceSet) -> ReferenceSet {
        let mut result = self.clone();
        result.add_all(other);
        result
    }

    pub fn intersection(&self, other: &ReferenceSet) -> ReferenceSet {
        ReferenceSet::from_normalized(
            set_ops::intersection(self.ranges.iter().cloned(), other.ranges.iter().cloned())
                .collect(),
        )
    }

    pub fn difference(&self, other: &ReferenceSet) -> ReferenceSet {
        ReferenceSet::from_normalized(
            set_ops::difference(self.ranges.iter().cloned(), other.ranges.iter().cloned())
                .collect(),
        )
    }

    /// Expands every ordinal by `amount` positions on each side, without
    /// crossing the boundary extent that contains it.
    ///
    /// The expansion is applied range-wise: the start of each range moves down
    /// by `amount` but not below the start of the extent holding that start,
    /// and the end moves up by `amount` but not past the end of the extent
    /// holding the last ordinal. Blurred ranges may then overlap, so they are
    /// re-merged. Blurring never removes an ordinal that was already present.
    pub fn blur(&self, amount: u32, boundaries: &dyn Boundaries) -> ReferenceSet {
        if amount == 0 || self.is_empty() {
            return self.clone();
        }

        let mut blurred = Vec::with_capacity(self.ranges.len());
        for range in &self.ranges {
            let last = range.end - 1;
            let low_extent = boundaries.extent_of(range.start);
            let high_extent = boundaries.extent_of(last);

            let start = range
                .start
                .saturating_sub(amount)
                .max(low_extent.start)
                .min(range.start);
            let end = range
                .end
                .saturating_add(amount)
                .min(high_extent.end)
                .max(range.end);

            // Extent starts grow with the ordinal, so `start` never decreases
            // from one range to the next and coalescing keeps the order.
            push_coalesced(&mut blurred, start..end);
        }
        ReferenceSet::from_normalized(blurred)
    }
}

/// Returns true if `ranges` satisfies the `ReferenceSet` invariants.
pub(crate) fn is_normalized(ranges: &[Range<u32>]) -> bool {
    ranges.iter().all(|r| r.start < r.end && r.end - 1 <= MAX_ORDINAL)
        && ranges.windows(2).all(|w| w[0].end < w[1].start)
}

impl FromIterator<u32> for ReferenceSet {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        let mut set = ReferenceSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<u32> for ReferenceSet {
    fn extend<T: IntoIterator<Item = u32>>(&mut self, iter: T) {
        for unit in iter {
            self.add(unit);
        }
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = u32;
    type IntoIter = Units<'a>;

    fn into_iter(self) -> Units<'a> {
        self.iter()
    }
}

/// Renders the set as a comma separated list of inclusive runs: `"1-3, 7"`.
impl fmt::Display for ReferenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if range.end - range.start == 1 {
                write!(f, "{}", range.start)?;
            } else {
                write!(f, "{}-{}", range.start, range.end - 1)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ReferenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReferenceSet[{self}]")
    }
}

/// Iterator over the ordinals of a [`ReferenceSet`].
#[derive(Clone)]
pub struct Units<'a> {
    ranges: std::slice::Iter<'a, Range<u32>>,
    current: Range<u32>,
}

impl Iterator for Units<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        loop {
            if let Some(unit) = self.current.next() {
                return Some(unit);
            }
            self.current = self.ranges.next()?.clone();
        }
    }
}

impl FusedIterator for Units<'_> {}
