//! The buffered exchanger façade a task uses instead of the raw channel.

use crate::channel::Channel;
use crate::config::TransportConfig;
use async_trait::async_trait;
use rf_error::{Result, RfError};
use rf_record::Record;
use rf_traits::{DirtyCollector, RecordReceiver, RecordSender};
use rf_transform::TransformerPipeline;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Produces empty records of the configured record implementation.
///
/// One factory per exchanger; jobs sharing a process never interfere
/// through a global record type.
pub type RecordFactory = Arc<dyn Fn() -> Record + Send + Sync>;

/// Cross-task abort signal for one exchanger.
///
/// Cloneable and callable from any task; the owning task observes the
/// flag on its next operation and fails with the shutdown error.
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    channel: Arc<Channel>,
}

impl ShutdownHandle {
    /// Signals shutdown and discards the channel's queued contents.
    /// Idempotent; repeated calls are no-ops.
    pub fn shutdown(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            debug!("Exchanger shutdown signaled");
            self.channel.clear();
        }
    }

    /// Returns true once shutdown has been signaled.
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Buffers records between a task and its channel, applying the
/// transformer pipeline on send.
///
/// One instance per task: the reader task drives it as a
/// [`RecordSender`], the writer task as a [`RecordReceiver`], both over
/// the same shared channel. The buffer is owned exclusively by the task
/// driving the exchanger; the channel is the only structure the two sides
/// share.
pub struct BufferedRecordExchanger {
    channel: Arc<Channel>,
    pipeline: TransformerPipeline,
    collector: Arc<dyn DirtyCollector>,
    record_factory: RecordFactory,

    buffer: VecDeque<Record>,
    buffer_size: usize,
    buffer_bytes: usize,
    byte_capacity: usize,

    shutdown: Arc<AtomicBool>,
    eof: bool,
}

impl BufferedRecordExchanger {
    /// Creates an exchanger over `channel`.
    ///
    /// The sender side passes the job's transformer pipeline; the
    /// receiver side passes [`TransformerPipeline::empty`].
    pub fn new(
        channel: Arc<Channel>,
        config: &TransportConfig,
        pipeline: TransformerPipeline,
        collector: Arc<dyn DirtyCollector>,
    ) -> Self {
        Self {
            channel,
            pipeline,
            collector,
            record_factory: Arc::new(Record::new),
            buffer: VecDeque::with_capacity(config.buffer_size),
            buffer_size: config.buffer_size,
            buffer_bytes: 0,
            byte_capacity: config.byte_capacity,
            shutdown: Arc::new(AtomicBool::new(false)),
            eof: false,
        }
    }

    /// Replaces the record factory.
    pub fn with_record_factory(mut self, factory: RecordFactory) -> Self {
        self.record_factory = factory;
        self
    }

    /// Returns the abort handle for this exchanger.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: self.shutdown.clone(),
            channel: self.channel.clone(),
        }
    }

    /// The pipeline's counters (sender side only sees non-zero values).
    pub fn pipeline_stats(&self) -> rf_transform::PipelineStats {
        self.pipeline.stats()
    }

    /// Snapshot of the shared channel's throughput counters, kept
    /// consistent with every flush the channel admitted.
    pub fn channel_stats(&self) -> crate::stats::StatsSnapshot {
        self.channel.stats().snapshot()
    }

    /// Best-effort abort: marks the exchanger shut down, discards the
    /// local buffer and the channel's queued contents. Never raises;
    /// idempotent. Every subsequent operation fails with the shutdown
    /// error so a task loop can tell forced termination from a normal
    /// end-of-stream.
    pub fn shutdown(&mut self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            debug!("Exchanger shut down");
        }
        self.buffer.clear();
        self.buffer_bytes = 0;
        self.channel.clear();
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(RfError::Shutdown);
        }
        Ok(())
    }

    async fn do_send(&mut self, record: Record) -> Result<()> {
        self.ensure_running()?;

        let record = match self.pipeline.apply(record)? {
            Some(record) => record,
            None => return Ok(()),
        };

        let size = record.memory_size();
        if size > self.byte_capacity {
            self.collector.collect(
                record,
                &format!(
                    "a single record of {size} bytes exceeds the byte capacity {}",
                    self.byte_capacity
                ),
            );
            return Ok(());
        }

        if self.buffer.len() >= self.buffer_size || self.buffer_bytes + size > self.byte_capacity {
            self.do_flush().await?;
        }

        self.buffer.push_back(record);
        self.buffer_bytes += size;
        Ok(())
    }

    async fn do_flush(&mut self) -> Result<()> {
        self.ensure_running()?;
        if self.buffer.is_empty() {
            return Ok(());
        }

        let batch: Vec<Record> = self.buffer.drain(..).collect();
        let bytes = self.buffer_bytes;
        self.buffer_bytes = 0;

        let count = batch.len();
        self.channel.push_all(batch).await?;
        trace!(count, bytes, "Buffer flushed to channel");
        Ok(())
    }

    async fn do_terminate(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.do_flush().await?;
        self.channel.push_terminate();
        Ok(())
    }

    async fn do_receive(&mut self) -> Result<Option<Record>> {
        self.ensure_running()?;
        if self.eof {
            return Ok(None);
        }

        loop {
            if let Some(record) = self.buffer.pop_front() {
                if record.is_terminator() {
                    // The sentinel never reaches writer business logic;
                    // latch end-of-stream instead.
                    self.eof = true;
                    debug!("End of stream observed");
                    return Ok(None);
                }
                return Ok(Some(record));
            }
            self.channel.pull_all(&mut self.buffer).await;
        }
    }
}

#[async_trait]
impl RecordSender for BufferedRecordExchanger {
    fn create_record(&self) -> Record {
        (self.record_factory)()
    }

    async fn send(&mut self, record: Record) -> Result<()> {
        self.do_send(record).await
    }

    async fn flush(&mut self) -> Result<()> {
        self.do_flush().await
    }

    async fn terminate(&mut self) -> Result<()> {
        self.do_terminate().await
    }
}

#[async_trait]
impl RecordReceiver for BufferedRecordExchanger {
    async fn receive(&mut self) -> Result<Option<Record>> {
        self.do_receive().await
    }
}

impl std::fmt::Debug for BufferedRecordExchanger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedRecordExchanger")
            .field("buffered", &self.buffer.len())
            .field("buffer_bytes", &self.buffer_bytes)
            .field("buffer_size", &self.buffer_size)
            .field("byte_capacity", &self.byte_capacity)
            .field("shutdown", &self.shutdown.load(Ordering::SeqCst))
            .field("eof", &self.eof)
            .finish()
    }
}
