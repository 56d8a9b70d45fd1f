//! Compact sets of corpus ordinals.
//!
//! This crate provides [`ReferenceSet`], the result type of every index lookup
//! and query evaluation, together with the pieces it is built from:
//!
//! - **Set operations**: streaming merge-join adapters over sorted range lists
//!   (union, intersection, difference).
//! - **Boundaries**: structural groupings (e.g. chapters) used to clamp
//!   [`ReferenceSet::blur`].
//! - **Binary codec**: a varint-encoded range list used as the on-disk payload
//!   of a word's matches.
//!
//! # Key Types
//!
//! - [`ReferenceSet`] - Sorted, non-touching list of half-open ordinal ranges
//! - [`Boundaries`] - Lookup of the structural extent containing an ordinal
//! - [`BoundaryTable`] / [`Unrestricted`] - The two `Boundaries` implementations

pub mod boundaries;
pub mod codec;
pub mod reference_set;
pub mod set_ops;
pub mod varint;

pub use boundaries::{Boundaries, BoundaryTable, Unrestricted};
pub use reference_set::{ReferenceSet, Units};

/// The largest ordinal a [`ReferenceSet`] can hold.
///
/// Ranges are stored half-open, so `u32::MAX` itself is reserved as the
/// exclusive end of the last possible range.
pub const MAX_ORDINAL: u32 = u32::MAX - 1;
