//! On-disk persistence of the word index.
//!
//! An index root directory holds exactly two files:
//!
//! - `ref.index`: UTF-8 text, one `word:offset:length` line per word, sorted
//!   by word. Its presence is the "is this corpus indexed" test.
//! - `ref.data`: the concatenation of the encoded
//!   [`ReferenceSet`](versedex_ranges::ReferenceSet)s, without any header.
//!   Each record is located only through its index line.
//!
//! Writes never touch a published root in place. An [`IndexWriter`] fills a
//! staging directory next to the root and [`IndexWriter::finish`] swaps it in
//! with two renames, so a loader sees either the old pair of files, no index,
//! or the new pair.

mod file;
mod index_file;
mod reader;
mod writer;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use versedex_common::{Result, error::Error};
use versedex_ranges::ReferenceSet;

pub use reader::LoadedIndex;
pub use writer::{IndexWriter, WriteSummary};

pub const INDEX_FILE: &str = "ref.index";
pub const DATA_FILE: &str = "ref.data";

/// Location of one word's encoded reference set inside `ref.data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Section {
    pub offset: u64,
    pub length: u32,
}

impl Section {
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}

/// Handle to the index files under one root directory.
#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    pub fn new(root: impl Into<PathBuf>) -> IndexStore {
        IndexStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn data_path(&self) -> PathBuf {
        self.root.join(DATA_FILE)
    }

    /// True iff both index files are present and readable.
    pub fn exists(&self) -> bool {
        [self.index_path(), self.data_path()]
            .iter()
            .all(|path| path.is_file() && fs::File::open(path).is_ok())
    }

    /// Opens the published index for reading.
    ///
    /// # Errors
    ///
    /// `Io` if the index file cannot be read. `CorruptIndex` if the index file
    /// is malformed, the data file cannot be opened, or a section lies past
    /// the end of the data file.
    pub fn load(&self) -> Result<LoadedIndex> {
        LoadedIndex::open(&self.root)
    }

    /// Starts writing a new index for this root.
    ///
    /// The published index, if any, stays readable until
    /// [`IndexWriter::finish`] swaps the new files in. Dropping the writer
    /// discards everything written so far. A previous index left set aside by
    /// an interrupted write is restored first.
    pub fn begin_write(&self) -> Result<IndexWriter> {
        IndexWriter::create(&self.root)
    }

    /// Writes `entries` as a complete index and publishes it.
    pub fn save(&self, entries: &BTreeMap<String, ReferenceSet>) -> Result<WriteSummary> {
        let mut writer = self.begin_write()?;
        for (word, set) in entries {
            writer.append(word, set)?;
        }
        writer.finish()
    }

    /// Removes the published index, if any.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(self.root.display().to_string(), e)),
        }
    }
}
