use std::sync::Arc;

use versedex_common::Result;
use versedex_ranges::{Boundaries, ReferenceSet};

use crate::{
    analyzer::Analyzer,
    backend::IndexSearcher,
    config::IndexConfig,
    store::{IndexStore, LoadedIndex},
};

/// Searcher over a loaded serialized index.
pub struct SerIndexSearcher {
    index: LoadedIndex,
    analyzer: Analyzer,
    restriction: Arc<dyn Boundaries>,
}

impl SerIndexSearcher {
    /// Loads the index published for `config`.
    pub fn open(config: &IndexConfig, restriction: Arc<dyn Boundaries>) -> Result<SerIndexSearcher> {
        config.validate()?;
        let analyzer = Analyzer::for_config(config)?;
        let index = IndexStore::new(&config.index_root).load()?;
        Ok(SerIndexSearcher::new(index, analyzer, restriction))
    }

    pub fn new(
        index: LoadedIndex,
        analyzer: Analyzer,
        restriction: Arc<dyn Boundaries>,
    ) -> SerIndexSearcher {
        SerIndexSearcher {
            index,
            analyzer,
            restriction,
        }
    }

    pub fn index(&self) -> &LoadedIndex {
        &self.index
    }
}

impl IndexSearcher for SerIndexSearcher {
    fn find(&self, word: &str) -> Result<ReferenceSet> {
        match self.analyzer.normalize(word) {
            Some(key) => self.index.find(&key),
            None => Ok(ReferenceSet::new()),
        }
    }

    fn prefix_search(&self, prefix: &str) -> Box<dyn Iterator<Item = String> + '_> {
        let prefix = self.analyzer.fold_prefix(prefix);
        Box::new(self.index.prefixed(&prefix).map(str::to_string))
    }

    fn restriction(&self) -> &dyn Boundaries {
        self.restriction.as_ref()
    }

    fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    fn word_count(&self) -> usize {
        self.index.word_count()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use versedex_ranges::Unrestricted;

    use super::*;

    #[test]
    fn test_find_normalizes_query_word() {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::new(dir.path().join("idx"));
        let mut entries = BTreeMap::new();
        entries.insert("god".to_string(), ReferenceSet::single(1));
        entries.insert("good".to_string(), ReferenceSet::single(4));
        IndexStore::new(&config.index_root).save(&entries).unwrap();

        let searcher = SerIndexSearcher::open(&config, Arc::new(Unrestricted::new(4))).unwrap();
        assert_eq!(searcher.find("God").unwrap(), ReferenceSet::single(1));
        assert_eq!(searcher.find("(GOD),").unwrap(), ReferenceSet::single(1));
        assert!(searcher.find("gods").unwrap().is_empty());
        assert!(searcher.find("...").unwrap().is_empty());
        assert_eq!(
            searcher.prefix_search("G").collect::<Vec<_>>(),
            vec!["god", "good"]
        );
        assert_eq!(searcher.word_count(), 2);
    }
}
