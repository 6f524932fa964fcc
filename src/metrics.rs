// Metrics hooks for the submission pipeline.
//
// Callers install a global `SubmitMetrics` implementation via [`set_submit_metrics`],
// then `DuplicateGuard` and `Submitter` report latency and outcome for every
// duplicate check and submission. No backend is bundled.
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use store::StoreError;

use crate::error::SubmitError;

/// Metrics observer for intake submissions.
pub trait SubmitMetrics: Send + Sync {
    /// `result` is `Ok(true)` when a duplicate was found, `Ok(false)` when the
    /// key was clear or incomplete.
    fn record_duplicate_check(&self, latency: Duration, result: Result<bool, StoreError>);

    /// Outcome of one `Submitter::submit` call, including rejected ones.
    fn record_submission(&self, latency: Duration, result: Result<(), SubmitError>);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn SubmitMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn SubmitMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn SubmitMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global submission metrics recorder.
pub fn set_submit_metrics(recorder: Option<Arc<dyn SubmitMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

pub(crate) struct MetricsSpan {
    recorder: Arc<dyn SubmitMetrics>,
    start: Instant,
}

impl MetricsSpan {
    pub(crate) fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    pub(crate) fn record_duplicate_check(self, result: Result<bool, StoreError>) {
        self.recorder
            .record_duplicate_check(self.start.elapsed(), result);
    }

    pub(crate) fn record_submission(self, result: Result<(), SubmitError>) {
        self.recorder.record_submission(self.start.elapsed(), result);
    }
}
