//! Channel throughput counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for what a channel actually admitted and drained.
///
/// Updated consistently with queue mutation so job-level statistics stay
/// in step with the transport; the termination sentinel is never counted.
#[derive(Debug, Default)]
pub struct ChannelStats {
    pushed_records: AtomicU64,
    pushed_bytes: AtomicU64,
    pulled_records: AtomicU64,
    pulled_bytes: AtomicU64,
}

impl ChannelStats {
    /// Records one admitted batch.
    pub fn record_push(&self, records: u64, bytes: u64) {
        self.pushed_records.fetch_add(records, Ordering::Relaxed);
        self.pushed_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records one drained batch.
    pub fn record_pull(&self, records: u64, bytes: u64) {
        self.pulled_records.fetch_add(records, Ordering::Relaxed);
        self.pulled_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pushed_records: self.pushed_records.load(Ordering::Relaxed),
            pushed_bytes: self.pushed_bytes.load(Ordering::Relaxed),
            pulled_records: self.pulled_records.load(Ordering::Relaxed),
            pulled_bytes: self.pulled_bytes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a channel's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub pushed_records: u64,
    pub pushed_bytes: u64,
    pub pulled_records: u64,
    pub pulled_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = ChannelStats::default();
        stats.record_push(3, 120);
        stats.record_push(2, 80);
        stats.record_pull(5, 200);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.pushed_records, 5);
        assert_eq!(snapshot.pushed_bytes, 200);
        assert_eq!(snapshot.pulled_records, 5);
        assert_eq!(snapshot.pulled_bytes, 200);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = ChannelStats::default();
        stats.record_push(1, 10);
        let json = serde_json::to_string(&stats.snapshot()).unwrap();
        assert!(json.contains("\"pushed_records\":1"));
    }
}
