//! Progress reporting and cooperative cancellation for long-running builds.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Receives build progress.
///
/// Called from the build thread; implementations must be cheap and must not
/// block.
pub trait ProgressSink: Send + Sync {
    /// `percent` is in `0..=100` and never decreases during one build.
    fn on_progress(&self, percent: u8, label: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(u8, &str) + Send + Sync,
{
    fn on_progress(&self, percent: u8, label: &str) {
        self(percent, label)
    }
}

/// A sink that discards every report.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _percent: u8, _label: &str) {}
}

/// A sink that forwards reports to the `log` facade at info level.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_progress(&self, percent: u8, label: &str) {
        log::info!("{percent:>3}% {label}");
    }
}

/// Shared cancellation request flag.
///
/// Clones observe the same flag. Cancellation is cooperative: the builder
/// checks the flag once per unit while scanning and once per word while
/// writing.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |percent: u8, label: &str| seen.lock().unwrap().push((percent, label.to_string()));
        sink.on_progress(10, "finding words (unit 1)");
        sink.on_progress(100, "saving");
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }
}
