//! The bounded, memory-accounted queue between a reader and a writer task.

use crate::config::TransportConfig;
use crate::stats::ChannelStats;
use parking_lot::Mutex;
use rf_error::{Result, RfError};
use rf_record::Record;
use std::collections::VecDeque;
use tokio::sync::Notify;
use tracing::{debug, trace};

/// An ordered record queue bounded by two independent limits: a maximum
/// element count and a maximum aggregate byte size.
///
/// The channel is the sole synchronization point between the two sides of
/// one task pair, and it expects exactly that discipline: a single
/// producer pushing and a single consumer pulling. Capacity checks apply
/// to a whole batch at once, so a batch whose records individually fit may
/// still wait for aggregate headroom.
///
/// The termination sentinel bypasses capacity entirely: it carries no
/// payload and must always be deliverable, or a consumer facing a full
/// channel could never learn the stream has ended.
pub struct Channel {
    capacity: usize,
    byte_capacity: usize,
    state: Mutex<ChannelState>,
    /// Signalled after a drain or clear frees headroom.
    not_full: Notify,
    /// Signalled after an admission makes records available.
    not_empty: Notify,
    stats: ChannelStats,
}

#[derive(Default)]
struct ChannelState {
    queue: VecDeque<Record>,
    queued_bytes: usize,
}

impl Channel {
    /// Creates an empty channel with the configured limits.
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            capacity: config.channel_capacity,
            byte_capacity: config.byte_capacity,
            state: Mutex::new(ChannelState::default()),
            not_full: Notify::new(),
            not_empty: Notify::new(),
            stats: ChannelStats::default(),
        }
    }

    /// Appends a batch atomically: either the whole batch is admitted, or
    /// the call suspends until a drain frees enough count and byte
    /// headroom. Partial admission is never observable.
    ///
    /// # Errors
    ///
    /// A batch that exceeds the channel's total limits on its own can
    /// never be admitted and fails with an illegal-value error instead of
    /// suspending forever.
    pub async fn push_all(&self, records: Vec<Record>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let count = records.len();
        let bytes: usize = records.iter().map(Record::memory_size).sum();

        if count > self.capacity || bytes > self.byte_capacity {
            return Err(RfError::IllegalValue(format!(
                "batch of {count} records / {bytes} bytes can never fit capacity {} / {} bytes",
                self.capacity, self.byte_capacity
            )));
        }

        loop {
            let headroom = self.not_full.notified();
            {
                let mut state = self.state.lock();
                let fits = state.queue.len() + count <= self.capacity
                    && state.queued_bytes + bytes <= self.byte_capacity;
                if fits {
                    state.queue.extend(records);
                    state.queued_bytes += bytes;
                    drop(state);

                    self.stats.record_push(count as u64, bytes as u64);
                    trace!(count, bytes, "Batch admitted");
                    self.not_empty.notify_one();
                    return Ok(());
                }
                trace!(
                    count,
                    bytes,
                    queued = state.queue.len(),
                    queued_bytes = state.queued_bytes,
                    "Channel full, producer waiting"
                );
            }
            headroom.await;
        }
    }

    /// Drains every currently queued record into `sink`, suspending while
    /// the channel is empty.
    pub async fn pull_all(&self, sink: &mut VecDeque<Record>) {
        loop {
            let available = self.not_empty.notified();
            {
                let mut state = self.state.lock();
                if !state.queue.is_empty() {
                    let mut count = state.queue.len();
                    if state.queue.back().is_some_and(Record::is_terminator) {
                        count -= 1;
                    }
                    let bytes = state.queued_bytes;

                    sink.append(&mut state.queue);
                    state.queued_bytes = 0;
                    drop(state);

                    self.stats.record_pull(count as u64, bytes as u64);
                    trace!(count, bytes, "Batch drained");
                    self.not_full.notify_one();
                    return;
                }
            }
            available.await;
        }
    }

    /// Enqueues the termination sentinel, bypassing capacity accounting.
    /// Never suspends.
    pub fn push_terminate(&self) {
        let mut state = self.state.lock();
        state.queue.push_back(Record::terminator());
        drop(state);

        debug!("Termination sentinel pushed");
        self.not_empty.notify_one();
    }

    /// Discards queued records and resets byte accounting. Used on forced
    /// shutdown; wakes a producer blocked on headroom.
    pub fn clear(&self) {
        let discarded = {
            let mut state = self.state.lock();
            let discarded = state.queue.len();
            state.queue.clear();
            state.queued_bytes = 0;
            discarded
        };

        debug!(discarded, "Channel cleared");
        self.not_full.notify_one();
    }

    /// Number of queued records, sentinel included.
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Returns true when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    /// Aggregate bytes currently queued.
    pub fn queued_bytes(&self) -> usize {
        self.state.lock().queued_bytes
    }

    /// The channel's throughput counters.
    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Channel")
            .field("capacity", &self.capacity)
            .field("byte_capacity", &self.byte_capacity)
            .field("queued", &state.queue.len())
            .field("queued_bytes", &state.queued_bytes)
            .finish()
    }
}
