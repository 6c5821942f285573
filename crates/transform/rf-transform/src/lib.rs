//! Row-level transform framework for rowflow pipelines.
//!
//! Transforms are named functions applied to every record between a reader
//! and the channel. Built-ins cover single-column filtering and string
//! manipulation; one scripted transform per job runs user-supplied Rhai
//! code against the whole row.
//!
//! # Example
//!
//! ```rust,ignore
//! use rf_transform::{TransformerPipeline, TransformerRegistry, TransformerSpec};
//!
//! let specs = vec![
//!     TransformerSpec::new("rf_filter")
//!         .with_column_index(0)
//!         .with_paras([">=", "10"]),
//!     TransformerSpec::new("rf_script")
//!         .with_code("if record[1] == () { () } else { record }"),
//! ];
//!
//! let registry = TransformerRegistry::new();
//! let mut pipeline = TransformerPipeline::build(&registry, &specs)?;
//! let kept = pipeline.apply(record)?;  // None means the record was dropped
//! ```

mod config;
mod execution;
mod filter;
mod registry;
mod script;
mod strings;

pub use config::TransformerSpec;
pub use execution::{
    PipelineStats, Transform, TransformContext, TransformerExecution, TransformerPipeline,
};
pub use filter::FilterTransformer;
pub use registry::{
    TransformBuilder, TransformerRegistry, FILTER_NAME, PAD_NAME, REPLACE_NAME, SCRIPT_NAME,
    SUBSTR_NAME,
};
pub use script::ScriptTransformer;
pub use strings::{PadTransformer, ReplaceTransformer, SubstrTransformer};
