//! Dirty-record collection seam.

use rf_record::Record;

/// Sink for records rejected from normal processing.
///
/// Collection is fire-and-forget from the transport layer's perspective:
/// it never raises, never blocks the pipeline, and a diverted record does
/// not fail the job. Whether an accumulated dirty count eventually fails
/// the job is policy belonging to the orchestration layer.
pub trait DirtyCollector: Send + Sync {
    /// Accepts the offending record together with a descriptive cause.
    fn collect(&self, record: Record, cause: &str);
}
