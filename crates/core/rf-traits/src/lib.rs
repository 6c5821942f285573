//! Plugin-facing traits for rowflow.
//!
//! Reader and writer plugins never touch the channel directly. A reader
//! drives a [`RecordSender`], a writer drains a [`RecordReceiver`], and
//! records that fail validation are diverted to a [`DirtyCollector`]
//! instead of failing the job.

mod collector;
mod exchange;
mod plugin;

pub use collector::DirtyCollector;
pub use exchange::{RecordReceiver, RecordSender};
pub use plugin::{Reader, Writer};
