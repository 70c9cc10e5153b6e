use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Per-stage item accounting.
///
/// Cloneable handle over shared counters: the worker thread records while
/// the pipeline keeps a handle for the final report. Counts are exact;
/// together with the endpoint counts they balance the books, so
/// `lines_read == lines_written + sum(dropped)` on a clean run.
#[derive(Debug, Clone, Default)]
pub struct StageMetrics {
    processed: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl StageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an item that was transformed and pushed downstream
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an item dropped by a transform failure
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Total items transformed and pushed downstream
    pub fn total_processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Total items dropped by transform failures
    pub fn total_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
