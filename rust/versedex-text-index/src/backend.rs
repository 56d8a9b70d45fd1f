//! Index backend contracts and the backend registry.
//!
//! A backend couples an [`IndexBuilder`] with the [`IndexSearcher`] able to
//! read what the builder published. Backends are looked up by name from an
//! explicit [`BackendRegistry`] built once at startup, normally from
//! [`IndexConfig::backend`].

use std::sync::Arc;

use versedex_common::{Result, error::Error};
use versedex_ranges::{Boundaries, ReferenceSet};

use crate::{
    analyzer::Analyzer,
    builder::{BuildOutcome, BuildState, SerIndexBuilder},
    config::{IndexConfig, SER_BACKEND},
    corpus::Corpus,
    progress::{CancelFlag, ProgressSink},
    searcher::SerIndexSearcher,
    store::IndexStore,
};

/// Builds an index over a whole corpus in one run.
pub trait IndexBuilder: Send {
    /// Scans the corpus and publishes the index.
    ///
    /// Runs at most once per builder; a second call fails with
    /// `InvalidOperation`. Returns [`BuildOutcome::Cancelled`] when `cancel`
    /// was raised before the index was published, in which case nothing on
    /// disk changed. I/O failures are reported as `Build` errors and also
    /// leave the previous index untouched.
    fn build(&mut self, sink: &dyn ProgressSink, cancel: &CancelFlag) -> Result<BuildOutcome>;

    fn state(&self) -> BuildState;
}

/// Read-only lookups over a published index.
///
/// Safe for any number of concurrent callers.
pub trait IndexSearcher: Send + Sync {
    /// Units containing `word`. The word is normalized the way indexed text
    /// is; unknown words yield the empty set.
    fn find(&self, word: &str) -> Result<ReferenceSet>;

    /// Indexed words starting with `prefix`, in ascending order.
    ///
    /// The sequence is lazy and finite; call again to restart it.
    fn prefix_search(&self, prefix: &str) -> Box<dyn Iterator<Item = String> + '_>;

    /// The extents that clamp blurring.
    fn restriction(&self) -> &dyn Boundaries;

    /// How query text is turned into index keys.
    fn analyzer(&self) -> &Analyzer;

    fn word_count(&self) -> usize;
}

/// A named index implementation.
pub trait IndexBackend: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// True if an index for `config` has been published.
    fn exists(&self, config: &IndexConfig) -> bool;

    fn create_builder(
        &self,
        config: &IndexConfig,
        corpus: Arc<dyn Corpus>,
    ) -> Result<Box<dyn IndexBuilder>>;

    fn open_searcher(
        &self,
        config: &IndexConfig,
        restriction: Arc<dyn Boundaries>,
    ) -> Result<Arc<dyn IndexSearcher>>;

    /// Removes the published index for `config`.
    fn delete(&self, config: &IndexConfig) -> Result<()>;
}

/// The serialized-index backend: `ref.index` plus `ref.data`.
pub struct SerBackend;

impl IndexBackend for SerBackend {
    fn name(&self) -> &str {
        SER_BACKEND
    }

    fn exists(&self, config: &IndexConfig) -> bool {
        IndexStore::new(&config.index_root).exists()
    }

    fn create_builder(
        &self,
        config: &IndexConfig,
        corpus: Arc<dyn Corpus>,
    ) -> Result<Box<dyn IndexBuilder>> {
        Ok(Box::new(SerIndexBuilder::new(config, corpus)?))
    }

    fn open_searcher(
        &self,
        config: &IndexConfig,
        restriction: Arc<dyn Boundaries>,
    ) -> Result<Arc<dyn IndexSearcher>> {
        Ok(Arc::new(SerIndexSearcher::open(config, restriction)?))
    }

    fn delete(&self, config: &IndexConfig) -> Result<()> {
        IndexStore::new(&config.index_root).delete()
    }
}

/// Maps backend names to implementations.
#[derive(Default, Clone)]
pub struct BackendRegistry {
    backends: ahash::AHashMap<String, Arc<dyn IndexBackend>>,
}

impl BackendRegistry {
    /// An empty registry.
    pub fn new() -> BackendRegistry {
        BackendRegistry::default()
    }

    /// A registry holding the built-in backends.
    pub fn with_defaults() -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        registry.add(SerBackend);
        registry
    }

    /// Registers `backend` under its name, replacing any previous one.
    pub fn add(&mut self, backend: impl IndexBackend) {
        let backend: Arc<dyn IndexBackend> = Arc::new(backend);
        self.backends.insert(backend.name().to_string(), backend);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn IndexBackend>> {
        self.backends.get(name).cloned().ok_or_else(|| {
            Error::invalid_arg("backend", format!("Index backend '{name}' not found"))
        })
    }

    /// The backend named by `config`, after validating the configuration.
    pub fn for_config(&self, config: &IndexConfig) -> Result<Arc<dyn IndexBackend>> {
        config.validate()?;
        self.get(&config.backend)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
