//! Inverted word index over an ordinal-addressable corpus.
//!
//! Every unit of the corpus (a verse, a paragraph) has an ordinal starting
//! at 1. Building an index maps every normalized word to the
//! [`ReferenceSet`](versedex_ranges::ReferenceSet) of units that contain it,
//! and publishes the result as a pair of files. Searching loads the word
//! table once and reads a word's reference set from disk on demand.
//!
//! # Overview
//!
//! 1. **Index Creation**: [`SerIndexBuilder`] walks the [`Corpus`], feeds each
//!    unit through the [`Analyzer`] (a tokenizer plus a collation), and writes
//!    the words in ascending order. Builds report progress and can be
//!    cancelled; a cancelled or failed build leaves the previously published
//!    index untouched.
//! 2. **Query Processing**: [`Query`] trees combine word lookups with set
//!    algebra and proximity ("blur"). [`QueryEngine`] parses query text,
//!    evaluates it, and also offers a ranked best-match search.
//!
//! Index implementations are looked up by name in a [`BackendRegistry`].
//!
//! # Quick Start
//!
//! ```rust
//! use versedex_text_index::{Query, Tokenizer, create_tokenizer};
//!
//! let tokenizer = create_tokenizer("plain-word").unwrap();
//! let words: Vec<&str> = tokenizer.tokenize("In the beginning, God created").collect();
//! assert_eq!(words, ["In", "the", "beginning", "God", "created"]);
//!
//! let query = Query::parse("god & (heaven | earth)").unwrap();
//! assert_eq!(query.to_string(), "(god & (heaven | earth))");
//! ```

pub mod analyzer;
pub mod backend;
pub mod builder;
pub mod collation;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod grammar;
pub mod progress;
pub mod query;
pub mod searcher;
pub mod store;
pub mod tally;
pub mod tokenizers;

pub use analyzer::Analyzer;
pub use backend::{BackendRegistry, IndexBackend, IndexBuilder, IndexSearcher, SerBackend};
pub use builder::{BuildJob, BuildOutcome, BuildState, BuildStats, SerIndexBuilder, spawn_build};
pub use collation::{Collation, create_collation};
pub use config::{IndexConfig, RestrictionType};
pub use corpus::{BoundaryId, Corpus, MemoryCorpus};
pub use engine::QueryEngine;
pub use progress::{CancelFlag, LogProgress, NoProgress, ProgressSink};
pub use query::Query;
pub use searcher::SerIndexSearcher;
pub use tally::Tally;
pub use tokenizers::{Tokenizer, create_tokenizer};
