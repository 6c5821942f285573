//! Dirty-record collector implementations.

use parking_lot::Mutex;
use rf_record::Record;
use rf_traits::DirtyCollector;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Logs diverted records and keeps a running count.
///
/// The default collector for jobs that only need dirty data surfaced in
/// the logs and counted against a job-level threshold.
#[derive(Debug, Default)]
pub struct LoggingDirtyCollector {
    collected: AtomicU64,
}

impl LoggingDirtyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records diverted so far.
    pub fn collected(&self) -> u64 {
        self.collected.load(Ordering::Relaxed)
    }
}

impl DirtyCollector for LoggingDirtyCollector {
    fn collect(&self, record: Record, cause: &str) {
        self.collected.fetch_add(1, Ordering::Relaxed);
        warn!(
            columns = record.column_count(),
            bytes = record.memory_size(),
            cause,
            "Diverted dirty record"
        );
    }
}

/// Retains diverted records in memory, for tests and development.
#[derive(Debug, Default)]
pub struct MemoryDirtyCollector {
    entries: Mutex<Vec<(Record, String)>>,
}

impl MemoryDirtyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records diverted so far.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true when nothing has been diverted.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The diverted records, in diversion order.
    pub fn records(&self) -> Vec<Record> {
        self.entries.lock().iter().map(|(r, _)| r.clone()).collect()
    }

    /// The recorded causes, in diversion order.
    pub fn causes(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, c)| c.clone()).collect()
    }
}

impl DirtyCollector for MemoryDirtyCollector {
    fn collect(&self, record: Record, cause: &str) {
        self.entries.lock().push((record, cause.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_record::Column;

    #[test]
    fn test_logging_collector_counts() {
        let collector = LoggingDirtyCollector::new();
        assert_eq!(collector.collected(), 0);

        collector.collect(
            Record::from_columns(vec![Column::long(1)]),
            "size limit exceeded",
        );
        collector.collect(Record::new(), "bad row");
        assert_eq!(collector.collected(), 2);
    }

    #[test]
    fn test_memory_collector_retains_order() {
        let collector = MemoryDirtyCollector::new();
        collector.collect(Record::from_columns(vec![Column::long(1)]), "first");
        collector.collect(Record::from_columns(vec![Column::long(2)]), "second");

        assert_eq!(collector.len(), 2);
        assert_eq!(collector.causes(), vec!["first", "second"]);
        assert_eq!(
            collector.records()[1].column(0),
            Some(&Column::long(2))
        );
    }
}
