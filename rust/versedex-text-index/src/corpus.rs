//! The corpus being indexed: ordinal-addressable units of text.

use std::{fs, path::Path, sync::Arc};

use versedex_common::{Result, error::Error};
use versedex_ranges::{Boundaries, BoundaryTable, Unrestricted};

use crate::config::RestrictionType;

/// Identifies the structural grouping (e.g. the chapter) a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundaryId(pub u32);

/// Read access to an immutable corpus of `unit_count()` units with ordinals
/// `1..=unit_count()`.
///
/// The corpus must not change while an index over it exists.
pub trait Corpus: Send + Sync {
    fn unit_count(&self) -> u32;

    /// Text of the unit at `ordinal`.
    ///
    /// May block on I/O. Fails for ordinals outside `1..=unit_count()`.
    fn text_of(&self, ordinal: u32) -> Result<String>;

    fn boundary_of(&self, ordinal: u32) -> BoundaryId;
}

/// Derives blur extents from the corpus: consecutive units sharing a
/// [`BoundaryId`] form one extent.
pub fn boundary_table(corpus: &dyn Corpus) -> BoundaryTable {
    BoundaryTable::from_fn(corpus.unit_count(), |ordinal| corpus.boundary_of(ordinal))
}

/// The blur restriction for `corpus` selected by `restriction`.
pub fn restriction_for(
    restriction: RestrictionType,
    corpus: &dyn Corpus,
) -> Arc<dyn Boundaries> {
    match restriction {
        RestrictionType::None => Arc::new(Unrestricted::new(corpus.unit_count())),
        RestrictionType::Boundary => Arc::new(boundary_table(corpus)),
    }
}

/// A corpus held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    units: Vec<(BoundaryId, String)>,
    labels: Vec<String>,
}

impl MemoryCorpus {
    /// A corpus whose units all share one boundary.
    pub fn from_units<I, S>(units: I) -> MemoryCorpus
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemoryCorpus {
            units: units
                .into_iter()
                .map(|text| (BoundaryId(0), text.into()))
                .collect(),
            labels: vec![String::new()],
        }
    }

    /// A corpus with an explicit boundary per unit.
    pub fn with_boundaries<I, S>(units: I) -> MemoryCorpus
    where
        I: IntoIterator<Item = (BoundaryId, S)>,
        S: Into<String>,
    {
        MemoryCorpus {
            units: units
                .into_iter()
                .map(|(id, text)| (id, text.into()))
                .collect(),
            labels: Vec::new(),
        }
    }

    /// Parses the line-oriented corpus format.
    ///
    /// A line starting with `#` opens a new boundary; the rest of the line is
    /// its label. Every other non-blank line is one unit, trimmed. Units that
    /// precede the first header share an unlabeled boundary.
    pub fn parse_text(text: &str) -> MemoryCorpus {
        let mut corpus = MemoryCorpus::default();
        for line in text.lines() {
            let line = line.trim();
            if let Some(label) = line.strip_prefix('#') {
                corpus.labels.push(label.trim().to_string());
            } else if !line.is_empty() {
                if corpus.labels.is_empty() {
                    corpus.labels.push(String::new());
                }
                let id = BoundaryId(corpus.labels.len() as u32 - 1);
                corpus.units.push((id, line.to_string()));
            }
        }
        corpus
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<MemoryCorpus> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(path.display().to_string(), e))?;
        let corpus = MemoryCorpus::parse_text(&text);
        log::debug!(
            "loaded corpus {}: {} units in {} boundaries",
            path.display(),
            corpus.units.len(),
            corpus.labels.len()
        );
        Ok(corpus)
    }

    /// Label of a boundary opened by a `#` header, if any.
    pub fn boundary_label(&self, id: BoundaryId) -> Option<&str> {
        self.labels
            .get(id.0 as usize)
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }

    /// A human readable reference for a unit: `"<label> <position>"`, where
    /// position counts units within the boundary starting at 1.
    pub fn reference_of(&self, ordinal: u32) -> Option<String> {
        let idx = (ordinal as usize).checked_sub(1)?;
        let (id, _) = self.units.get(idx)?;
        let position = self.units[..=idx]
            .iter()
            .rev()
            .take_while(|(other, _)| other == id)
            .count();
        Some(match self.boundary_label(*id) {
            Some(label) => format!("{label} {position}"),
            None => ordinal.to_string(),
        })
    }
}

impl Corpus for MemoryCorpus {
    fn unit_count(&self) -> u32 {
        self.units.len() as u32
    }

    fn text_of(&self, ordinal: u32) -> Result<String> {
        (ordinal as usize)
            .checked_sub(1)
            .and_then(|idx| self.units.get(idx))
            .map(|(_, text)| text.clone())
            .ok_or_else(|| {
                Error::invalid_arg(
                    "ordinal",
                    format!("{ordinal} is outside 1..={}", self.units.len()),
                )
            })
    }

    fn boundary_of(&self, ordinal: u32) -> BoundaryId {
        (ordinal as usize)
            .checked_sub(1)
            .and_then(|idx| self.units.get(idx))
            .map_or(BoundaryId(u32::MAX), |(id, _)| *id)
    }
}

#[cfg(test)]
mod tests {
    use versedex_ranges::Boundaries;

    use super::*;

    const TEXT: &str = "\
# Genesis 1
In the beginning God created the heaven and the earth.
And the earth was without form, and void.

# Genesis 2
Thus the heavens and the earth were finished.
";

    #[test]
    fn test_parse_text() {
        let corpus = MemoryCorpus::parse_text(TEXT);
        assert_eq!(corpus.unit_count(), 3);
        assert!(corpus.text_of(1).unwrap().starts_with("In the beginning"));
        assert_eq!(corpus.boundary_of(2), BoundaryId(0));
        assert_eq!(corpus.boundary_of(3), BoundaryId(1));
        assert_eq!(corpus.boundary_label(BoundaryId(1)), Some("Genesis 2"));
        assert_eq!(corpus.reference_of(2).as_deref(), Some("Genesis 1 2"));
        assert_eq!(corpus.reference_of(3).as_deref(), Some("Genesis 2 1"));
        assert_eq!(corpus.reference_of(4), None);
    }

    #[test]
    fn test_out_of_range_text() {
        let corpus = MemoryCorpus::from_units(["a", "b"]);
        assert!(corpus.text_of(0).is_err());
        assert!(corpus.text_of(3).is_err());
        assert_eq!(corpus.text_of(2).unwrap(), "b");
        assert_eq!(corpus.reference_of(1).as_deref(), Some("1"));
    }

    #[test]
    fn test_restrictions() {
        let corpus = MemoryCorpus::parse_text(TEXT);
        let table = restriction_for(RestrictionType::Boundary, &corpus);
        assert_eq!(table.extent_of(2), 1..3);
        assert_eq!(table.extent_of(3), 3..4);

        let unrestricted = restriction_for(RestrictionType::None, &corpus);
        assert_eq!(unrestricted.extent_of(2), 1..4);
    }
}
