//! Per-sink delivery counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single sink
///
/// Shared between the registry entry, the sink task and any `SinkRef`.
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Messages waiting in the sink queue
    queue_len: AtomicUsize,
    /// Messages handed into the queue by fan-out
    delivered_count: AtomicU64,
    /// Messages the sink wrote successfully
    write_count: AtomicU64,
    /// Messages the sink failed to write
    failure_count: AtomicU64,
    /// Messages discarded because the queue was full
    dropped_count: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub(crate) fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_delivered_count(&self) {
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            delivered_count: self.delivered_count(),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub delivered_count: u64,
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
}

impl MetricsSnapshot {
    /// Messages accepted by fan-out that the sink has not finished yet
    pub fn in_flight(&self) -> u64 {
        self.delivered_count
            .saturating_sub(self.write_count + self.failure_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = SinkMetrics::new();
        metrics.inc_delivered_count();
        metrics.inc_delivered_count();
        metrics.inc_delivered_count();
        metrics.inc_write_count();
        metrics.inc_failure_count();
        metrics.inc_dropped_count();
        metrics.set_queue_len(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.delivered_count, 3);
        assert_eq!(snapshot.write_count, 1);
        assert_eq!(snapshot.failure_count, 1);
        assert_eq!(snapshot.dropped_count, 1);
        assert_eq!(snapshot.queue_len, 1);
        assert_eq!(snapshot.in_flight(), 1);
    }
}
