//! Sender/receiver seams between plugins and the transport layer.

use async_trait::async_trait;
use rf_error::Result;
use rf_record::Record;

/// The handle a reader task uses to emit records.
///
/// # Lifecycle
///
/// 1. [`create_record`](RecordSender::create_record) to obtain an empty
///    record of the configured implementation
/// 2. [`send`](RecordSender::send) once per populated record
/// 3. [`terminate`](RecordSender::terminate) exactly once after the last
///    record
///
/// Every operation fails with a shutdown error after the owning task has
/// been shut down.
#[async_trait]
pub trait RecordSender: Send {
    /// Produces an empty record of the configured record implementation.
    fn create_record(&self) -> Record;

    /// Sends one record toward the writer.
    ///
    /// The record first passes through the configured transformer
    /// pipeline; vetoed and oversized records are consumed without error.
    /// Suspends when the channel is at capacity.
    async fn send(&mut self, record: Record) -> Result<()>;

    /// Pushes all buffered records to the channel as one batch.
    async fn flush(&mut self) -> Result<()>;

    /// Flushes pending records, then signals end-of-stream.
    async fn terminate(&mut self) -> Result<()>;
}

/// The handle a writer task uses to consume records.
#[async_trait]
pub trait RecordReceiver: Send {
    /// Returns the next record in reader order, or `None` once the
    /// stream has terminated. Suspends while no records are available.
    async fn receive(&mut self) -> Result<Option<Record>>;
}
