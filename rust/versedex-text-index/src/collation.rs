//! Folding of words into index keys.
//!
//! The word index is a sorted map keyed by folded words, so the collation
//! decides both which query words find an entry and which words a prefix scan
//! visits. The same collation must be used when an index is built and when it
//! is searched. The index files do not record it: the builder and the searcher
//! both take it from the [`IndexConfig`](crate::config::IndexConfig), so an
//! index must be opened with the configuration it was built with.
//!
//! # Available Collations
//!
//! - **Unicode Case Insensitive** (`"unicode-case-insensitive"`, default):
//!   keys are lower-cased, so `God`, `GOD` and `god` share one entry.
//! - **Unicode Case Preserving** (`"unicode-case-preserving"`): keys are the
//!   words as written.

use std::borrow::Cow;

use versedex_common::{Result, error::Error};

pub trait Collation: Send + Sync + 'static {
    fn kind(&self) -> CollationKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn clone_boxed(&self) -> Box<dyn Collation>;

    /// Returns the index key of `word`.
    ///
    /// Folding is idempotent: `fold(fold(w)) == fold(w)`.
    fn fold<'a>(&self, word: &'a str) -> Cow<'a, str>;

    /// Tests whether the key `key` starts with the already folded `prefix`.
    fn starts_with(&self, key: &str, prefix: &str) -> bool {
        key.starts_with(prefix)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CollationKind {
    UnicodeCaseInsensitive,
    UnicodeCasePreserving,
}

impl TryFrom<&str> for CollationKind {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        match name {
            "unicode-case-insensitive" => Ok(CollationKind::UnicodeCaseInsensitive),
            "unicode-case-preserving" => Ok(CollationKind::UnicodeCasePreserving),
            _ => Err(Error::invalid_arg(
                "collation",
                format!("Unrecognized collation: {name}"),
            )),
        }
    }
}

impl CollationKind {
    pub const fn name(&self) -> &'static str {
        match self {
            CollationKind::UnicodeCaseInsensitive => "unicode-case-insensitive",
            CollationKind::UnicodeCasePreserving => "unicode-case-preserving",
        }
    }
}

/// Creates a collation by its configuration name.
pub fn create_collation(name: &str) -> Result<Box<dyn Collation>> {
    match CollationKind::try_from(name)? {
        CollationKind::UnicodeCaseInsensitive => Ok(Box::new(UnicodeCaseInsensitiveCollation)),
        CollationKind::UnicodeCasePreserving => Ok(Box::new(UnicodeCasePreservingCollation)),
    }
}

/// Lower-cases every character using the Unicode default case mapping.
pub struct UnicodeCaseInsensitiveCollation;

impl Collation for UnicodeCaseInsensitiveCollation {
    fn kind(&self) -> CollationKind {
        CollationKind::UnicodeCaseInsensitive
    }

    fn clone_boxed(&self) -> Box<dyn Collation> {
        Box::new(UnicodeCaseInsensitiveCollation)
    }

    fn fold<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if word.chars().any(|c| c.to_lowercase().ne(std::iter::once(c))) {
            Cow::Owned(word.to_lowercase())
        } else {
            Cow::Borrowed(word)
        }
    }
}

/// Keys are the words exactly as the tokenizer produced them.
pub struct UnicodeCasePreservingCollation;

impl Collation for UnicodeCasePreservingCollation {
    fn kind(&self) -> CollationKind {
        CollationKind::UnicodeCasePreserving
    }

    fn clone_boxed(&self) -> Box<dyn Collation> {
        Box::new(UnicodeCasePreservingCollation)
    }

    fn fold<'a>(&self, word: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(word)
    }
}
