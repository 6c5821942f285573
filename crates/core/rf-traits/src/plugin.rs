//! Reader and writer plugin traits.

use crate::{RecordReceiver, RecordSender};
use async_trait::async_trait;
use rf_error::Result;

/// A source plugin: produces records into a sender until exhausted.
///
/// Implementations call [`RecordSender::terminate`] exactly once after
/// their last record; the transport layer turns that into the
/// end-of-stream signal the paired writer observes.
#[async_trait]
pub trait Reader: Send {
    async fn read(&mut self, sender: &mut dyn RecordSender) -> Result<()>;
}

/// A sink plugin: consumes records from a receiver until end-of-stream.
#[async_trait]
pub trait Writer: Send {
    async fn write(&mut self, receiver: &mut dyn RecordReceiver) -> Result<()>;
}
