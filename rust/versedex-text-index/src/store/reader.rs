use std::{
    collections::BTreeMap,
    fs::{self, File},
    ops::Bound,
    path::{Path, PathBuf},
};

use versedex_common::{Result, error::Error, verify_data};
use versedex_ranges::{ReferenceSet, codec};

use super::{DATA_FILE, INDEX_FILE, Section, file::file_read_at_exact, index_file};

/// A published index opened for reading.
///
/// Immutable for its whole lifetime: the word map is read once and the data
/// file is only accessed with positional reads, so one `LoadedIndex` serves
/// any number of concurrent readers. The data file handle is released when the
/// index is dropped.
#[derive(Debug)]
pub struct LoadedIndex {
    root: PathBuf,
    words: BTreeMap<String, Section>,
    data: File,
    data_len: u64,
}

impl LoadedIndex {
    pub(crate) fn open(root: &Path) -> Result<LoadedIndex> {
        let index_path = root.join(INDEX_FILE);
        let data_path = root.join(DATA_FILE);

        let bytes =
            fs::read(&index_path).map_err(|e| Error::io(index_path.display().to_string(), e))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::corrupt_index(INDEX_FILE, format!("not UTF-8: {e}")))?;
        let words = index_file::parse(&text)?;

        // The index file names sections of the data file, so a data file that
        // cannot be opened leaves the index unusable.
        let unreadable = |e: std::io::Error| {
            Error::corrupt_index(
                DATA_FILE,
                format!("cannot read {}: {e}", data_path.display()),
            )
        };
        let data = File::open(&data_path).map_err(unreadable)?;
        let data_len = data.metadata().map_err(unreadable)?.len();

        for (word, section) in &words {
            if section.length == 0 || section.end() > data_len {
                return Err(Error::corrupt_index(
                    DATA_FILE,
                    format!(
                        "section {}+{} of {word:?} is outside the {data_len} byte data file",
                        section.offset, section.length
                    ),
                ));
            }
        }

        log::info!(
            "loaded index {}: {} words, {} data bytes",
            root.display(),
            words.len(),
            data_len
        );
        Ok(LoadedIndex {
            root: root.to_path_buf(),
            words,
            data,
            data_len,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    pub fn section(&self, key: &str) -> Option<Section> {
        self.words.get(key).copied()
    }

    /// Reads the reference set stored for an already normalized key.
    /// Absent keys yield the empty set.
    pub fn find(&self, key: &str) -> Result<ReferenceSet> {
        match self.section(key) {
            Some(section) => self.read_section(section),
            None => Ok(ReferenceSet::new()),
        }
    }

    pub fn read_section(&self, section: Section) -> Result<ReferenceSet> {
        verify_data!(DATA_FILE, section.end() <= self.data_len);

        let mut buf = vec![0u8; section.length as usize];
        file_read_at_exact(&self.data, section.offset, &mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::corrupt_index(DATA_FILE, format!("short read at offset {}", section.offset))
            } else {
                Error::io(DATA_FILE, e)
            }
        })?;
        codec::decode(&buf)
    }

    /// All keys in ascending order.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Section)> + '_ {
        self.words.iter().map(|(word, section)| (word.as_str(), *section))
    }

    /// Keys starting with `prefix`, in ascending order.
    ///
    /// A range scan from `prefix`, stopped at the first key that no longer
    /// starts with it.
    pub fn prefixed<'a>(&'a self, prefix: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        let range = self
            .words
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded));
        let prefix = prefix.to_string();
        range
            .map(|(word, _)| word.as_str())
            .take_while(move |word| word.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::store::IndexStore;

    fn saved(words: &[(&str, &[u32])]) -> (tempfile::TempDir, IndexStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("idx"));
        let map: BTreeMap<String, ReferenceSet> = words
            .iter()
            .map(|(w, units)| (w.to_string(), units.iter().copied().collect()))
            .collect();
        store.save(&map).unwrap();
        (dir, store)
    }

    #[test]
    fn test_prefixed() {
        let (_dir, store) = saved(&[
            ("loathe", &[1]),
            ("love", &[2]),
            ("lovely", &[3]),
            ("loves", &[4]),
            ("lp", &[5]),
        ]);
        let index = store.load().unwrap();
        assert_eq!(
            index.prefixed("lov").collect::<Vec<_>>(),
            vec!["love", "lovely", "loves"]
        );
        assert_eq!(index.prefixed("z").count(), 0);
        assert_eq!(index.prefixed("").count(), 5);
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexStore::new(dir.path()).load().unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_section_past_end_is_corrupt() {
        let (_dir, store) = saved(&[("god", &[1])]);
        fs::write(store.index_path(), "god:0:3\nlight:3:40\n").unwrap();
        assert!(store.load().unwrap_err().is_corrupt_index());
    }

    #[test]
    fn test_truncated_data_is_corrupt() {
        let (_dir, store) = saved(&[("god", &[1]), ("light", &[1, 2, 9])]);
        let index = store.load().unwrap();
        // light is encoded as 2 ranges: 5 bytes at offset 3
        let section = index.section("light").unwrap();
        assert_eq!(section, Section { offset: 3, length: 5 });
        assert!(
            index
                .read_section(Section { offset: 3, length: 4 })
                .unwrap_err()
                .is_corrupt_index()
        );
        assert!(
            index
                .read_section(Section { offset: 6, length: 40 })
                .unwrap_err()
                .is_corrupt_index()
        );
    }

    #[test]
    fn test_garbage_data_is_corrupt() {
        let (_dir, store) = saved(&[("god", &[1])]);
        fs::write(store.data_path(), [0xFF, 0xFF, 0xFF]).unwrap();
        let index = store.load().unwrap();
        assert!(index.find("god").unwrap_err().is_corrupt_index());
    }
}
