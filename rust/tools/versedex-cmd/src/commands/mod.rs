//! Command implementations for versedex-cmd

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Args;
use versedex_ranges::{Boundaries, MAX_ORDINAL, Unrestricted};
use versedex_text_index::{
    BackendRegistry, IndexConfig, MemoryCorpus, Query, QueryEngine, RestrictionType,
    corpus::restriction_for,
};

pub mod build;
pub mod inspect;
pub mod search;

/// Where the index and its corpus live.
#[derive(Args, Debug, Clone, Default)]
pub struct IndexArgs {
    /// JSON index configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Index directory (overrides `index_root` of the configuration)
    #[arg(long, global = true)]
    pub index: Option<PathBuf>,

    /// Corpus file (overrides `corpus_root` of the configuration)
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,
}

impl IndexArgs {
    /// Resolves the configuration from `--config`, then applies `--index` and
    /// `--corpus`.
    pub fn config(&self) -> Result<IndexConfig> {
        let mut config = match (&self.config, &self.index) {
            (Some(path), _) => IndexConfig::from_json_file(path)
                .with_context(|| format!("Failed to read configuration {}", path.display()))?,
            (None, Some(index)) => IndexConfig::new(index),
            (None, None) => anyhow::bail!("Either --index or --config is required"),
        };
        if let Some(index) = &self.index {
            config.index_root = index.clone();
        }
        if let Some(corpus) = &self.corpus {
            config.corpus_root = Some(corpus.clone());
        }
        Ok(config)
    }

    /// Opens the published index for querying.
    pub fn open(&self) -> Result<Session> {
        let config = self.config()?;
        let corpus = load_corpus(&config)?;
        let registry = BackendRegistry::with_defaults();
        let backend = registry.for_config(&config)?;
        if !backend.exists(&config) {
            anyhow::bail!("No index found at {}", config.index_root.display());
        }

        let missing_boundaries =
            corpus.is_none() && config.blur_restriction == RestrictionType::Boundary;
        let restriction: Arc<dyn Boundaries> = match &corpus {
            Some(corpus) => restriction_for(config.blur_restriction, corpus),
            None => {
                log::info!("no corpus given, blur is only clamped at the last ordinal");
                Arc::new(Unrestricted::new(MAX_ORDINAL))
            }
        };
        let searcher = backend
            .open_searcher(&config, restriction)
            .with_context(|| format!("Failed to open index {}", config.index_root.display()))?;

        Ok(Session {
            corpus,
            engine: QueryEngine::new(searcher),
            missing_boundaries,
        })
    }
}

/// An opened index together with its optional corpus.
pub struct Session {
    pub corpus: Option<MemoryCorpus>,
    pub engine: QueryEngine,
    /// Blur must stop at corpus boundaries, but there is no corpus to read
    /// them from.
    missing_boundaries: bool,
}

impl Session {
    /// The corpus, for commands that print unit text.
    pub fn require_corpus(&self) -> Result<&MemoryCorpus> {
        self.corpus
            .as_ref()
            .context("--corpus (or corpus_root in the configuration) is required to show text")
    }

    /// Fails for a blurring query when the boundaries that limit blur are
    /// unknown.
    pub fn check_blur(&self, text: &str) -> Result<()> {
        if self.missing_boundaries && Query::parse(text)?.has_blur() {
            anyhow::bail!(
                "Query '{text}' blurs within corpus boundaries: pass --corpus, \
                 or set blur_restriction to \"none\" in the configuration"
            );
        }
        Ok(())
    }
}

pub fn load_corpus(config: &IndexConfig) -> Result<Option<MemoryCorpus>> {
    config
        .corpus_root
        .as_ref()
        .map(|path| {
            MemoryCorpus::from_file(path)
                .with_context(|| format!("Failed to load corpus {}", path.display()))
        })
        .transpose()
}
