//! Building the serialized index.
//!
//! A build runs through `NotStarted -> Scanning -> Writing -> Done`. While
//! scanning, every unit of the corpus is tokenized and its ordinal added to the
//! reference set of each of its words. While writing, the sets are encoded in
//! word order into a staging directory which is then published atomically (see
//! [`store`](crate::store)). Either phase may end in `Cancelled` instead; a
//! failure ends in `Failed`. Neither touches a previously published index.
//!
//! Progress runs from 0 to 90 while scanning and from 90 to 100 while writing.

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use ahash::AHashMap;
use versedex_common::{Result, error::Error};
use versedex_ranges::ReferenceSet;

use crate::{
    analyzer::Analyzer,
    backend::IndexBuilder,
    config::IndexConfig,
    corpus::Corpus,
    progress::{CancelFlag, ProgressSink},
    store::IndexStore,
};

const SCAN_PERCENT: u64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    NotStarted,
    Scanning,
    Writing,
    Done,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub unit_count: u32,
    pub word_count: usize,
    pub data_len: u64,
    pub elapsed: Duration,
}

/// How a build ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Completed(BuildStats),
    /// Cancellation was requested; nothing was published.
    Cancelled,
}

impl BuildOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BuildOutcome::Cancelled)
    }
}

/// Builder of the `ser` backend.
pub struct SerIndexBuilder {
    store: IndexStore,
    corpus: Arc<dyn Corpus>,
    analyzer: Analyzer,
    state: BuildState,
}

/// Emits a report only when the integer percentage changes.
struct Progress<'a> {
    sink: &'a dyn ProgressSink,
    last: Option<u8>,
}

impl Progress<'_> {
    fn report(&mut self, percent: u8, label: impl FnOnce() -> String) {
        if self.last != Some(percent) {
            self.last = Some(percent);
            self.sink.on_progress(percent, &label());
        }
    }

    fn force(&mut self, percent: u8, label: &str) {
        self.last = Some(percent);
        self.sink.on_progress(percent, label);
    }
}

impl SerIndexBuilder {
    pub fn new(config: &IndexConfig, corpus: Arc<dyn Corpus>) -> Result<SerIndexBuilder> {
        config.validate()?;
        Ok(SerIndexBuilder {
            store: IndexStore::new(&config.index_root),
            corpus,
            analyzer: Analyzer::for_config(config)?,
            state: BuildState::NotStarted,
        })
    }

    /// Tokenizes every unit. `None` when cancelled.
    fn scan(
        &self,
        progress: &mut Progress,
        cancel: &CancelFlag,
    ) -> Result<Option<AHashMap<String, ReferenceSet>>> {
        let unit_count = self.corpus.unit_count();
        let mut words: AHashMap<String, ReferenceSet> = AHashMap::new();
        log::debug!("scanning {unit_count} units");

        for ordinal in 1..=unit_count {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let text = self
                .corpus
                .text_of(ordinal)
                .map_err(|e| Error::build(format!("reading unit {ordinal}"), e))?;
            for term in self.analyzer.terms(&text) {
                words.entry(term).or_default().add(ordinal);
            }

            let percent = (SCAN_PERCENT * ordinal as u64 / unit_count as u64) as u8;
            progress.report(percent, || format!("finding words (unit {ordinal})"));
        }

        log::debug!("scan found {} distinct words", words.len());
        Ok(Some(words))
    }

    /// Encodes and publishes the word sets. `None` when cancelled.
    fn write(
        &self,
        words: AHashMap<String, ReferenceSet>,
        progress: &mut Progress,
        cancel: &CancelFlag,
    ) -> Result<Option<(usize, u64)>> {
        let mut words: Vec<(String, ReferenceSet)> = words.into_iter().collect();
        words.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let total = words.len() as u64;

        let mut writer = self
            .store
            .begin_write()
            .map_err(|e| Error::build("creating staging directory", e))?;
        for (written, (word, set)) in words.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            writer
                .append(word, set)
                .map_err(|e| Error::build(format!("writing {word:?}"), e))?;

            let written = written as u64 + 1;
            let percent = (SCAN_PERCENT + (100 - SCAN_PERCENT) * written / total) as u8;
            progress.report(percent, || format!("writing words ({written})"));
        }
        if cancel.is_cancelled() {
            return Ok(None);
        }

        progress.force(100, "saving");
        let summary = writer
            .finish()
            .map_err(|e| Error::build("publishing index", e))?;
        Ok(Some((summary.word_count, summary.data_len)))
    }

    fn run(&mut self, sink: &dyn ProgressSink, cancel: &CancelFlag) -> Result<BuildOutcome> {
        let started = Instant::now();
        let mut progress = Progress { sink, last: None };

        self.state = BuildState::Scanning;
        progress.report(0, || "finding words".to_string());
        let Some(words) = self.scan(&mut progress, cancel)? else {
            return Ok(self.cancelled());
        };

        self.state = BuildState::Writing;
        let Some((word_count, data_len)) = self.write(words, &mut progress, cancel)? else {
            return Ok(self.cancelled());
        };

        self.state = BuildState::Done;
        let stats = BuildStats {
            unit_count: self.corpus.unit_count(),
            word_count,
            data_len,
            elapsed: started.elapsed(),
        };
        log::info!(
            "indexed {} units into {}: {} words, {} data bytes in {:?}",
            stats.unit_count,
            self.store.root().display(),
            stats.word_count,
            stats.data_len,
            stats.elapsed
        );
        Ok(BuildOutcome::Completed(stats))
    }

    fn cancelled(&mut self) -> BuildOutcome {
        log::warn!(
            "index build for {} cancelled while {:?}",
            self.store.root().display(),
            self.state
        );
        self.state = BuildState::Cancelled;
        BuildOutcome::Cancelled
    }
}

impl IndexBuilder for SerIndexBuilder {
    fn build(&mut self, sink: &dyn ProgressSink, cancel: &CancelFlag) -> Result<BuildOutcome> {
        if self.state != BuildState::NotStarted {
            return Err(Error::invalid_operation(format!(
                "build: builder is {:?}",
                self.state
            )));
        }
        let result = self.run(sink, cancel);
        if result.is_err() {
            self.state = BuildState::Failed;
        }
        result
    }

    fn state(&self) -> BuildState {
        self.state
    }
}

/// A build running on its own thread.
pub struct BuildJob {
    handle: thread::JoinHandle<Result<BuildOutcome>>,
    cancel: CancelFlag,
}

impl BuildJob {
    /// Requests cancellation; the build stops at its next check.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the build to end.
    pub fn join(self) -> Result<BuildOutcome> {
        self.handle.join().unwrap_or_else(|_| {
            Err(Error::build(
                "build thread",
                Error::invalid_operation("build thread panicked"),
            ))
        })
    }
}

/// Runs `builder` on a dedicated worker thread.
pub fn spawn_build(
    mut builder: Box<dyn IndexBuilder>,
    sink: Arc<dyn ProgressSink>,
) -> Result<BuildJob> {
    let cancel = CancelFlag::new();
    let thread_cancel = cancel.clone();
    let handle = thread::Builder::new()
        .name("versedex-build".to_string())
        .spawn(move || builder.build(sink.as_ref(), &thread_cancel))
        .map_err(|e| Error::io("spawning build thread", e))?;
    Ok(BuildJob { handle, cancel })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{corpus::MemoryCorpus, progress::NoProgress};

    fn builder(dir: &tempfile::TempDir, units: &[&str]) -> SerIndexBuilder {
        let config = IndexConfig::new(dir.path().join("idx"));
        let corpus = Arc::new(MemoryCorpus::from_units(units.iter().copied()));
        SerIndexBuilder::new(&config, corpus).unwrap()
    }

    #[test]
    fn test_state_machine() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder(&dir, &["God created", "the earth"]);
        assert_eq!(builder.state(), BuildState::NotStarted);

        let outcome = builder.build(&NoProgress, &CancelFlag::new()).unwrap();
        let BuildOutcome::Completed(stats) = outcome else {
            panic!("unexpected {outcome:?}");
        };
        assert_eq!(stats.unit_count, 2);
        assert_eq!(stats.word_count, 4);
        assert_eq!(builder.state(), BuildState::Done);

        let err = builder.build(&NoProgress, &CancelFlag::new()).unwrap_err();
        assert!(matches!(
            err.kind(),
            versedex_common::error::ErrorKind::InvalidOperation { .. }
        ));
    }

    #[test]
    fn test_progress_is_monotonic_and_complete() {
        let dir = tempfile::tempdir().unwrap();
        let units: Vec<String> = (0..250).map(|i| format!("word{i} common")).collect();
        let units: Vec<&str> = units.iter().map(String::as_str).collect();
        let mut builder = builder(&dir, &units);

        let reports = Mutex::new(Vec::new());
        let sink = |percent: u8, label: &str| {
            reports.lock().unwrap().push((percent, label.to_string()));
        };
        builder.build(&sink, &CancelFlag::new()).unwrap();

        let reports = reports.into_inner().unwrap();
        assert!(reports.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(reports.first().unwrap().0, 0);
        assert_eq!(reports.last().unwrap(), &(100, "saving".to_string()));
        assert!(reports.iter().any(|(p, l)| *p == 90 && l.starts_with("finding words")));
        assert!(reports.iter().any(|(_, l)| l.starts_with("writing words")));
    }

    #[test]
    fn test_cancel_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = builder(&dir, &["God created"]);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let outcome = builder.build(&NoProgress, &cancel).unwrap();
        assert!(outcome.is_cancelled());
        assert_eq!(builder.state(), BuildState::Cancelled);
        assert!(!IndexStore::new(dir.path().join("idx")).exists());
    }

    struct FailingCorpus;

    impl Corpus for FailingCorpus {
        fn unit_count(&self) -> u32 {
            3
        }

        fn text_of(&self, ordinal: u32) -> Result<String> {
            if ordinal == 2 {
                Err(Error::io(
                    "unit 2",
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                ))
            } else {
                Ok("text".to_string())
            }
        }

        fn boundary_of(&self, _ordinal: u32) -> crate::corpus::BoundaryId {
            crate::corpus::BoundaryId(0)
        }
    }

    #[test]
    fn test_corpus_failure_is_build_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::new(dir.path().join("idx"));
        let mut builder = SerIndexBuilder::new(&config, Arc::new(FailingCorpus)).unwrap();
        let err = builder.build(&NoProgress, &CancelFlag::new()).unwrap_err();
        assert!(matches!(
            err.kind(),
            versedex_common::error::ErrorKind::Build { .. }
        ));
        assert_eq!(builder.state(), BuildState::Failed);
        assert!(!IndexStore::new(&config.index_root).exists());
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("idx"));
        builder(&dir, &["God created", "the earth"])
            .build(&NoProgress, &CancelFlag::new())
            .unwrap();
        let index = std::fs::read(store.index_path()).unwrap();
        let data = std::fs::read(store.data_path()).unwrap();

        let config = IndexConfig::new(store.root());
        let mut builder = SerIndexBuilder::new(&config, Arc::new(FailingCorpus)).unwrap();
        assert!(builder.build(&NoProgress, &CancelFlag::new()).is_err());
        assert_eq!(builder.state(), BuildState::Failed);

        assert_eq!(std::fs::read(store.index_path()).unwrap(), index);
        assert_eq!(std::fs::read(store.data_path()).unwrap(), data);
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("idx")]);
        assert_eq!(
            store.load().unwrap().find("earth").unwrap(),
            ReferenceSet::single(2)
        );
    }

    #[test]
    fn test_spawn_build() {
        let dir = tempfile::tempdir().unwrap();
        let builder = builder(&dir, &["God created", "the earth"]);
        let job = spawn_build(Box::new(builder), Arc::new(NoProgress)).unwrap();
        let outcome = job.join().unwrap();
        assert!(matches!(outcome, BuildOutcome::Completed(_)));
        assert!(IndexStore::new(dir.path().join("idx")).exists());
    }
}
