use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::TempDir;
use versedex_common::{Result, error::Error};
use versedex_ranges::{ReferenceSet, codec};

use super::{DATA_FILE, INDEX_FILE, Section, file::sync_dir, index_file};

/// Summary of a published index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub word_count: usize,
    pub data_len: u64,
}

/// Writes a new index into a staging directory and publishes it.
///
/// Words must be appended in strictly ascending order; the index file is
/// written in that order. Nothing becomes visible under the index root until
/// [`finish`](Self::finish) succeeds; dropping the writer removes the staging
/// directory.
pub struct IndexWriter {
    root: PathBuf,
    staging: TempDir,
    data: BufWriter<File>,
    offset: u64,
    index: String,
    last_word: Option<String>,
    word_count: usize,
    buf: Vec<u8>,
}

impl IndexWriter {
    pub(crate) fn create(root: &Path) -> Result<IndexWriter> {
        let (parent, name) = split_root(root)?;
        fs::create_dir_all(&parent).map_err(|e| Error::io(parent.display().to_string(), e))?;
        recover_interrupted_writes(root, &parent, &name);

        let staging = tempfile::Builder::new()
            .prefix(&format!(".{name}.building-"))
            .tempdir_in(&parent)
            .map_err(|e| Error::io(parent.display().to_string(), e))?;
        let data_path = staging.path().join(DATA_FILE);
        let data = File::create(&data_path)
            .map_err(|e| Error::io(data_path.display().to_string(), e))?;

        log::debug!("staging index for {} in {}", root.display(), staging.path().display());
        Ok(IndexWriter {
            root: root.to_path_buf(),
            staging,
            data: BufWriter::new(data),
            offset: 0,
            index: String::new(),
            last_word: None,
            word_count: 0,
            buf: Vec::new(),
        })
    }

    pub fn staging_path(&self) -> &Path {
        self.staging.path()
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Appends the encoded `set` for `word` to the data file.
    pub fn append(&mut self, word: &str, set: &ReferenceSet) -> Result<Section> {
        if word.is_empty() || word.contains(['\n', '\r']) {
            return Err(Error::invalid_arg("word", format!("{word:?} cannot be stored")));
        }
        if self.last_word.as_deref().is_some_and(|last| last >= word) {
            return Err(Error::invalid_arg(
                "word",
                format!("{word:?} is not after {:?}", self.last_word),
            ));
        }

        self.buf.clear();
        codec::encode_into(set, &mut self.buf);
        let length = u32::try_from(self.buf.len())
            .map_err(|_| Error::invalid_arg("set", format!("encoding of {word:?} is too large")))?;
        self.data
            .write_all(&self.buf)
            .map_err(|e| Error::io(DATA_FILE, e))?;

        let section = Section {
            offset: self.offset,
            length,
        };
        self.offset += length as u64;
        index_file::write_line(&mut self.index, word, section);
        self.last_word = Some(word.to_string());
        self.word_count += 1;
        Ok(section)
    }

    /// Writes the index file, syncs both files and swaps the staging
    /// directory in as the index root.
    pub fn finish(self) -> Result<WriteSummary> {
        let IndexWriter {
            root,
            staging,
            data,
            offset,
            index,
            word_count,
            ..
        } = self;

        let data = data
            .into_inner()
            .map_err(|e| Error::io(DATA_FILE, e.into_error()))?;
        data.sync_all().map_err(|e| Error::io(DATA_FILE, e))?;
        drop(data);

        let index_path = staging.path().join(INDEX_FILE);
        let mut index_out =
            File::create(&index_path).map_err(|e| Error::io(INDEX_FILE, e))?;
        index_out
            .write_all(index.as_bytes())
            .and_then(|()| index_out.sync_all())
            .map_err(|e| Error::io(INDEX_FILE, e))?;
        drop(index_out);

        publish(staging, &root)?;
        log::debug!(
            "published index {}: {word_count} words, {offset} data bytes",
            root.display()
        );
        Ok(WriteSummary {
            word_count,
            data_len: offset,
        })
    }
}

fn split_root(root: &Path) -> Result<(PathBuf, String)> {
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::invalid_arg("index_root", format!("{} has no name", root.display())))?;
    let parent = match root.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((parent, name.to_string()))
}

/// Moves `staging` into place as `root`.
///
/// A previous root is first renamed aside and deleted only after the new
/// directory is in place. If the second rename fails the previous root is
/// restored.
fn publish(staging: TempDir, root: &Path) -> Result<()> {
    let (parent, name) = split_root(root)?;
    let aside = parent.join(format!(
        ".{name}.old-{}",
        staging
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.rsplit('-').next())
            .unwrap_or("0")
    ));

    let had_previous = root.exists();
    if had_previous {
        fs::rename(root, &aside).map_err(|e| Error::io(root.display().to_string(), e))?;
    }

    if let Err(e) = fs::rename(staging.path(), root) {
        if had_previous {
            if let Err(restore) = fs::rename(&aside, root) {
                log::warn!("failed to restore {} from {}: {restore}", root.display(), aside.display());
            }
        }
        return Err(Error::io(root.display().to_string(), e));
    }
    // The staging path no longer exists; keep the TempDir from deleting anything.
    let _ = staging.keep();

    if let Err(e) = sync_dir(&parent) {
        log::warn!("failed to sync {}: {e}", parent.display());
    }
    if had_previous {
        if let Err(e) = fs::remove_dir_all(&aside) {
            log::warn!("failed to remove previous index {}: {e}", aside.display());
        }
    }
    Ok(())
}

/// Cleans up after writes to `root` that were interrupted.
///
/// Staging directories are removed. A set-aside previous index is the only
/// copy when a write stopped between the two renames of [`publish`]: with
/// `root` missing and exactly one set-aside directory, it is renamed back.
/// Set-aside directories are only deleted while `root` exists.
fn recover_interrupted_writes(root: &Path, parent: &Path, name: &str) {
    let Ok(entries) = fs::read_dir(parent) else {
        return;
    };
    let building = format!(".{name}.building-");
    let old = format!(".{name}.old-");
    let mut aside = Vec::new();
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with(&building) {
            remove_stale(&entry.path());
        } else if file_name.starts_with(&old) {
            aside.push(entry.path());
        }
    }

    if root.exists() {
        aside.iter().for_each(|path| remove_stale(path));
        return;
    }
    match aside.as_slice() {
        [] => {}
        [previous] => match fs::rename(previous, root) {
            Ok(()) => log::warn!(
                "restored index {} from interrupted write {}",
                root.display(),
                previous.display()
            ),
            Err(e) => log::warn!(
                "failed to restore {} from {}: {e}",
                root.display(),
                previous.display()
            ),
        },
        _ => log::warn!(
            "{} is missing and {} set-aside copies exist; leaving them in place",
            root.display(),
            aside.len()
        ),
    }
}

fn remove_stale(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => log::debug!("removed stale {}", path.display()),
        Err(e) => log::warn!("failed to remove stale {}: {e}", path.display()),
    }
}
