//! Bounded, memory-accounted record transport for rowflow.
//!
//! One synchronization job runs many reader/writer task pairs; each pair
//! is connected by exactly one [`Channel`]. Tasks never touch the channel
//! directly: the reader drives a [`BufferedRecordExchanger`] as a sender,
//! which applies the job's transformer pipeline, coalesces records into
//! batches, diverts oversized rows to the dirty collector and enforces
//! the byte budget; the writer drives its own exchanger as a receiver.
//!
//! # Example
//!
//! ```rust,ignore
//! use rf_channel::{exchanger_pair, LoggingDirtyCollector, TransportConfig};
//! use rf_traits::{RecordReceiver, RecordSender};
//! use rf_transform::TransformerPipeline;
//! use std::sync::Arc;
//!
//! let (mut sender, mut receiver) = exchanger_pair(
//!     &TransportConfig::default(),
//!     TransformerPipeline::empty(),
//!     Arc::new(LoggingDirtyCollector::new()),
//! )?;
//!
//! // Reader task:
//! let mut record = sender.create_record();
//! // ... populate columns ...
//! sender.send(record).await?;
//! sender.terminate().await?;
//!
//! // Writer task:
//! while let Some(record) = receiver.receive().await? {
//!     // ... write the record ...
//! }
//! ```

mod channel;
mod collector;
mod config;
mod exchanger;
mod stats;

pub use channel::Channel;
pub use collector::{LoggingDirtyCollector, MemoryDirtyCollector};
pub use config::{
    TransportConfig, DEFAULT_BUFFER_SIZE, DEFAULT_BYTE_CAPACITY, DEFAULT_CHANNEL_CAPACITY,
};
pub use exchanger::{BufferedRecordExchanger, RecordFactory, ShutdownHandle};
pub use stats::{ChannelStats, StatsSnapshot};

use rf_error::Result;
use rf_traits::DirtyCollector;
use rf_transform::TransformerPipeline;
use std::sync::Arc;

/// Builds the sender-side and receiver-side exchangers of one task pair
/// over a fresh shared channel.
///
/// The transformer pipeline runs on the sender side; each half carries
/// its own shutdown flag, matching the one-exchanger-per-task ownership
/// model.
pub fn exchanger_pair(
    config: &TransportConfig,
    pipeline: TransformerPipeline,
    collector: Arc<dyn DirtyCollector>,
) -> Result<(BufferedRecordExchanger, BufferedRecordExchanger)> {
    config.validate()?;
    let channel = Arc::new(Channel::new(config));

    let sender = BufferedRecordExchanger::new(channel.clone(), config, pipeline, collector.clone());
    let receiver = BufferedRecordExchanger::new(
        channel,
        config,
        TransformerPipeline::empty(),
        collector,
    );
    Ok((sender, receiver))
}
