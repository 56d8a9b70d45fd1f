use versedex_common::Result;

use crate::{
    collation::{Collation, create_collation},
    config::IndexConfig,
    tokenizers::{Tokenizer, TokenizerType, create_tokenizer},
};

/// A tokenizer paired with a collation: turns text into index keys.
///
/// The builder and the searcher of one index share an analyzer configuration,
/// which keeps indexed words and query words comparable.
pub struct Analyzer {
    tokenizer: TokenizerType,
    collation: Box<dyn Collation>,
    english: bool,
}

impl Analyzer {
    pub fn new(tokenizer: &str, collation: &str) -> Result<Analyzer> {
        Ok(Analyzer {
            tokenizer: create_tokenizer(tokenizer)?,
            collation: create_collation(collation)?,
            english: true,
        })
    }

    /// The analyzer named by `config`, with its locale.
    pub fn for_config(config: &IndexConfig) -> Result<Analyzer> {
        Ok(Analyzer::new(&config.tokenizer, &config.collation)?.with_locale(&config.locale))
    }

    /// Sets the language of the corpus. English word rules (small words and
    /// grammatical roots) only apply to `en` locales.
    pub fn with_locale(mut self, locale: &str) -> Analyzer {
        self.english = is_english(locale);
        self
    }

    pub fn is_english(&self) -> bool {
        self.english
    }

    pub fn tokenizer(&self) -> &TokenizerType {
        &self.tokenizer
    }

    pub fn collation(&self) -> &dyn Collation {
        self.collation.as_ref()
    }

    /// The index keys of every word in `text`, in text order, duplicates kept.
    pub fn terms<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.tokenizer
            .tokenize(text)
            .map(move |word| self.collation.fold(word).into_owned())
    }

    /// Normalizes a single query word to its index key.
    ///
    /// The word goes through the tokenizer as well, so surrounding punctuation
    /// is stripped the same way it is during indexing. Input that tokenizes
    /// into several words keeps only the first; input with no word yields
    /// `None`.
    pub fn normalize(&self, word: &str) -> Option<String> {
        let token = self.tokenizer.tokenize(word).next()?;
        Some(self.collation.fold(token).into_owned())
    }

    /// Folds a prefix without tokenizing it, so a trailing separator such as
    /// a hyphen survives.
    pub fn fold_prefix(&self, prefix: &str) -> String {
        self.collation.fold(prefix.trim()).into_owned()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer {
            tokenizer: TokenizerType::PlainWord(Default::default()),
            collation: Box::new(crate::collation::UnicodeCaseInsensitiveCollation),
            english: true,
        }
    }
}

fn is_english(locale: &str) -> bool {
    let language = locale.split(['-', '_']).next().unwrap_or_default();
    language.eq_ignore_ascii_case("en")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_are_folded() {
        let analyzer = Analyzer::default();
        let terms: Vec<String> = analyzer.terms("God created. God saw").collect();
        assert_eq!(terms, vec!["god", "created", "god", "saw"]);
    }

    #[test]
    fn test_normalize_query_word() {
        let analyzer = Analyzer::default();
        assert_eq!(analyzer.normalize("Earth,").as_deref(), Some("earth"));
        assert_eq!(analyzer.normalize("  LOVE  ").as_deref(), Some("love"));
        assert_eq!(analyzer.normalize("..."), None);
        assert_eq!(analyzer.fold_prefix("Abel-"), "abel-");
    }

    #[test]
    fn test_configured_analyzer() {
        let analyzer = Analyzer::new("unicode-word", "unicode-case-preserving").unwrap();
        let terms: Vec<String> = analyzer.terms("Abel-Beth").collect();
        assert_eq!(terms, vec!["Abel", "Beth"]);
        assert!(Analyzer::new("nope", "unicode-case-preserving").is_err());
    }

    #[test]
    fn test_locale() {
        let mut config = IndexConfig::new("idx");
        assert!(Analyzer::for_config(&config).unwrap().is_english());
        config.locale = "en_GB".to_string();
        assert!(Analyzer::for_config(&config).unwrap().is_english());
        config.locale = "de-DE".to_string();
        assert!(!Analyzer::for_config(&config).unwrap().is_english());
        assert!(!Analyzer::default().with_locale("fr").is_english());
    }
}
