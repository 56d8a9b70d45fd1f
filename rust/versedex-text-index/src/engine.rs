use std::sync::Arc;

use versedex_common::Result;
use versedex_ranges::ReferenceSet;

use crate::{
    backend::IndexSearcher,
    grammar,
    query::{Query, grammar_matches},
    tally::Tally,
};

/// Runs queries against one searcher.
#[derive(Clone)]
pub struct QueryEngine {
    searcher: Arc<dyn IndexSearcher>,
}

impl QueryEngine {
    pub fn new(searcher: Arc<dyn IndexSearcher>) -> QueryEngine {
        QueryEngine { searcher }
    }

    pub fn searcher(&self) -> &dyn IndexSearcher {
        self.searcher.as_ref()
    }

    pub fn evaluate(&self, query: &Query) -> Result<ReferenceSet> {
        query.find(self.searcher.as_ref())
    }

    /// Parses and evaluates `text`, keeping only units inside `restriction`
    /// when one is given.
    ///
    /// Syntax errors are `Query` errors carrying `text`; failures reading the
    /// index are returned as they are.
    pub fn search(&self, text: &str, restriction: Option<&ReferenceSet>) -> Result<ReferenceSet> {
        let query = Query::parse(text)?;
        log::debug!("search {text:?} parsed as {query}");
        let mut result = self.evaluate(&query)?;
        if let Some(restriction) = restriction {
            result.retain_all(restriction);
        }
        Ok(result)
    }

    /// Ranks units by how many of the words of `text` they match.
    ///
    /// The text is split into words by the searcher's analyzer. For English
    /// corpora the most frequent words are ignored, and each remaining word is
    /// reduced to its grammatical root when the root itself is an indexed
    /// word. A word then matches every unit containing a word that starts with
    /// it, and a unit scores one hit per query word it matches.
    pub fn best_match(&self, text: &str, restriction: Option<&ReferenceSet>) -> Result<Tally> {
        let analyzer = self.searcher.analyzer();
        let mut tally = Tally::new();

        for word in analyzer.terms(text) {
            if analyzer.is_english() && grammar::is_small_word(&word) {
                continue;
            }
            let mut matches = grammar_matches(self.searcher.as_ref(), &word)?;
            if let Some(restriction) = restriction {
                matches.retain_all(restriction);
            }
            log::trace!("best match: {word:?} hits {} units", matches.len());
            tally.add_set(&matches);
        }
        Ok(tally)
    }
}
