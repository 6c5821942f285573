//! Transport tuning options.

use rf_error::{Result, RfError};
use serde::{Deserialize, Serialize};

/// Default channel element-count limit.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 512;

/// Default byte capacity, shared by the channel and the exchanger buffer
/// (8 MiB).
pub const DEFAULT_BYTE_CAPACITY: usize = 8 * 1024 * 1024;

/// Default exchanger buffer element-count limit.
pub const DEFAULT_BUFFER_SIZE: usize = 32;

/// Tuning knobs for one channel and its exchanger pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Maximum queued elements in the channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Maximum aggregate record bytes, both queued in the channel and
    /// buffered in an exchanger. A single record above this limit is
    /// diverted as dirty.
    #[serde(default = "default_byte_capacity")]
    pub byte_capacity: usize,

    /// Exchanger buffer element-count limit; a full buffer flushes to the
    /// channel as one batch.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_byte_capacity() -> usize {
    DEFAULT_BYTE_CAPACITY
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            byte_capacity: DEFAULT_BYTE_CAPACITY,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl TransportConfig {
    /// Sets the channel element-count limit.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the byte capacity.
    pub fn with_byte_capacity(mut self, bytes: usize) -> Self {
        self.byte_capacity = bytes;
        self
    }

    /// Sets the exchanger buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Rejects configurations that could never move a record.
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(RfError::IllegalValue(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.byte_capacity == 0 {
            return Err(RfError::IllegalValue(
                "byte_capacity must be at least 1".to_string(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(RfError::IllegalValue(
                "buffer_size must be at least 1".to_string(),
            ));
        }
        if self.buffer_size > self.channel_capacity {
            return Err(RfError::IllegalValue(format!(
                "buffer_size {} exceeds channel_capacity {}, a full buffer could never flush",
                self.buffer_size, self.channel_capacity
            )));
        }
        Ok(())
    }
}
