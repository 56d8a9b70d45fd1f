//! Streaming set operations over sorted lists of ordinal ranges.
//!
//! Every adapter in this module expects its inputs to be *normalized*:
//! * ranges are half-open (`start..end`) and non-empty,
//! * ranges are sorted ascending by `start`,
//! * no two ranges of the same input overlap or touch.
//!
//! Under these preconditions each adapter performs a single merge-join pass,
//! O(len(a) + len(b)) comparisons with constant extra memory, and yields a
//! normalized output stream.

use std::{iter::Peekable, ops::Range};

/// Creates an iterator over the union of two normalized range streams.
///
/// Overlapping or adjacent ranges from either side are coalesced, so the
/// output never contains two touching ranges.
pub fn union<L, R>(a: L, b: R) -> UnionRanges<L::IntoIter, R::IntoIter>
where
    L: IntoIterator<Item = Range<u32>>,
    R: IntoIterator<Item = Range<u32>>,
{
    UnionRanges {
        a: a.into_iter().peekable(),
        b: b.into_iter().peekable(),
    }
}

/// Creates an iterator over the intersection of two normalized range streams.
pub fn intersection<L, R>(a: L, b: R) -> IntersectionRanges<L::IntoIter, R::IntoIter>
where
    L: IntoIterator<Item = Range<u32>>,
    R: IntoIterator<Item = Range<u32>>,
{
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    IntersectionRanges {
        cur_a: a.next(),
        cur_b: b.next(),
        a,
        b,
    }
}

/// Creates an iterator over the ranges of `a` that are not covered by `b`.
pub fn difference<L, R>(a: L, b: R) -> DifferenceRanges<L::IntoIter, R::IntoIter>
where
    L: IntoIterator<Item = Range<u32>>,
    R: IntoIterator<Item = Range<u32>>,
{
    let mut a = a.into_iter();
    DifferenceRanges {
        cur_a: a.next(),
        a,
        b: b.into_iter().peekable(),
    }
}

/// Appends `range` to a normalized vector, merging it into the last range when
/// they overlap or touch.
///
/// `range.start` must not be smaller than the start of the last range.
pub fn push_coalesced(ranges: &mut Vec<Range<u32>>, range: Range<u32>) {
    if range.is_empty() {
        return;
    }
    match ranges.last_mut() {
        Some(last) if range.start <= last.end => {
            debug_assert!(range.start >= last.start);
            last.end = last.end.max(range.end);
        }
        _ => ranges.push(range),
    }
}

/// Iterator adapter yielding the union of two normalized range streams.
pub struct UnionRanges<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    a: Peekable<I>,
    b: Peekable<J>,
}

impl<I, J> UnionRanges<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    fn take_lower(&mut self) -> Option<Range<u32>> {
        let take_a = match (self.a.peek(), self.b.peek()) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(ra), Some(rb)) => ra.start <= rb.start,
        };
        if take_a { self.a.next() } else { self.b.next() }
    }
}

impl<I, J> Iterator for UnionRanges<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    type Item = Range<u32>;

    fn next(&mut self) -> Option<Range<u32>> {
        let mut cur = self.take_lower()?;
        loop {
            let a_joins = self.a.peek().is_some_and(|r| r.start <= cur.end);
            let b_joins = self.b.peek().is_some_and(|r| r.start <= cur.end);
            if !a_joins && !b_joins {
                return Some(cur);
            }
            if a_joins {
                if let Some(r) = self.a.next() {
                    cur.end = cur.end.max(r.end);
                }
            }
            if b_joins {
                if let Some(r) = self.b.next() {
                    cur.end = cur.end.max(r.end);
                }
            }
        }
    }
}

/// Iterator adapter yielding the intersection of two normalized range streams.
pub struct IntersectionRanges<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    a: I,
    b: J,
    cur_a: Option<Range<u32>>,
    cur_b: Option<Range<u32>>,
}

impl<I, J> Iterator for IntersectionRanges<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    type Item = Range<u32>;

    fn next(&mut self) -> Option<Range<u32>> {
        loop {
            let (ra, rb) = match (&self.cur_a, &self.cur_b) {
                (Some(ra), Some(rb)) => (ra.clone(), rb.clone()),
                _ => return None,
            };

            let start = ra.start.max(rb.start);
            let end = ra.end.min(rb.end);

            // Advance whichever side finishes first; both when they end together.
            if ra.end <= rb.end {
                self.cur_a = self.a.next();
            }
            if rb.end <= ra.end {
                self.cur_b = self.b.next();
            }

            if start < end {
                return Some(start..end);
            }
        }
    }
}

/// Iterator adapter yielding the ranges of one normalized stream that are not
/// covered by another.
pub struct DifferenceRanges<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    a: I,
    b: Peekable<J>,
    cur_a: Option<Range<u32>>,
}

impl<I, J> Iterator for DifferenceRanges<I, J>
where
    I: Iterator<Item = Range<u32>>,
    J: Iterator<Item = Range<u32>>,
{
    type Item = Range<u32>;

    fn next(&mut self) -> Option<Range<u32>> {
        loop {
            let mut cur = self.cur_a.take()?;

            // Drop subtrahend ranges that end before the current range starts.
            while self.b.peek().is_some_and(|rb| rb.end <= cur.start) {
                self.b.next();
            }

            match self.b.peek() {
                Some(rb) if rb.start < cur.end => {
                    let rb = rb.clone();
                    let head = cur.start..rb.start.max(cur.start);
                    if rb.end < cur.end {
                        // The remainder after `rb` stays current; `rb` is exhausted.
                        cur.start = rb.end;
                        self.cur_a = Some(cur);
                        self.b.next();
                    } else {
                        self.cur_a = self.a.next();
                    }
                    if !head.is_empty() {
                        return Some(head);
                    }
                }
                _ => {
                    self.cur_a = self.a.next();
                    return Some(cur);
                }
            }
        }
    }
}
