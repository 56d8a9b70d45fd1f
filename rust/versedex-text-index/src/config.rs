//! Index configuration.
//!
//! An [`IndexConfig`] is an explicit value passed to the registry, the builder
//! and the store. It is usually read from a JSON file:
//!
//! ```json
//! {
//!   "index_root": "/var/lib/versedex/kjv",
//!   "corpus_root": "/usr/share/versedex/kjv.txt",
//!   "locale": "en",
//!   "tokenizer": "plain-word",
//!   "collation": "unicode-case-insensitive",
//!   "blur_restriction": "boundary"
//! }
//! ```
//!
//! Every field except `index_root` has a default.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use versedex_common::{Result, error::Error};

use crate::{collation::CollationKind, tokenizers::TokenizerKind};

/// Name of the serialized-index backend.
pub const SER_BACKEND: &str = "ser";

/// How far a blur may spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionType {
    /// Blur is only clamped at the corpus edges.
    None,
    /// Blur never crosses a corpus boundary (e.g. a chapter).
    #[default]
    Boundary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the index files.
    pub index_root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_root: Option<PathBuf>,
    /// Language of the corpus, e.g. `en` or `en-GB`. Best-match search only
    /// applies English word rules to `en` locales.
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_tokenizer")]
    pub tokenizer: String,
    #[serde(default = "default_collation")]
    pub collation: String,
    #[serde(default)]
    pub blur_restriction: RestrictionType,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_backend() -> String {
    SER_BACKEND.to_string()
}

fn default_tokenizer() -> String {
    TokenizerKind::PlainWord.name().to_string()
}

fn default_collation() -> String {
    CollationKind::UnicodeCaseInsensitive.name().to_string()
}

impl IndexConfig {
    /// A configuration with defaults for everything but the index location.
    pub fn new(index_root: impl Into<PathBuf>) -> IndexConfig {
        IndexConfig {
            index_root: index_root.into(),
            corpus_root: None,
            locale: default_locale(),
            backend: default_backend(),
            tokenizer: default_tokenizer(),
            collation: default_collation(),
            blur_restriction: RestrictionType::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<IndexConfig> {
        let config: IndexConfig = serde_json::from_str(json)
            .map_err(|e| Error::invalid_arg("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<IndexConfig> {
        let path = path.as_ref();
        let json =
            fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        IndexConfig::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::invalid_arg("config", e.to_string()))
    }

    /// Checks that the tokenizer and collation names are known and the index
    /// root and locale are set. Backend names are checked by the registry.
    pub fn validate(&self) -> Result<()> {
        if self.index_root.as_os_str().is_empty() {
            return Err(Error::invalid_arg("index_root", "must not be empty"));
        }
        TokenizerKind::try_from(self.tokenizer.as_str())?;
        CollationKind::try_from(self.collation.as_str())?;
        if self.locale.trim().is_empty() {
            return Err(Error::invalid_arg("locale", "must not be empty"));
        }
        if self.backend.is_empty() {
            return Err(Error::invalid_arg("backend", "must not be empty"));
        }
        Ok(())
    }

    pub fn with_restriction(mut self, restriction: RestrictionType) -> IndexConfig {
        self.blur_restriction = restriction;
        self
    }
}
