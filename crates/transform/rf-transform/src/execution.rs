//! Pipeline construction and per-record evaluation.

use crate::config::TransformerSpec;
use crate::registry::{TransformerRegistry, SCRIPT_NAME};
use rf_error::{Result, RfError, TransformError};
use rf_record::Record;
use std::collections::HashMap;
use tracing::{debug, info};

/// Mutable key-value state shared by every stage of one pipeline, for the
/// lifetime of the owning task.
pub type TransformContext = HashMap<String, serde_json::Value>;

/// A row-level transform function.
///
/// `evaluate` threads the record forward: `Ok(Some(record))` keeps the
/// (possibly mutated) record, `Ok(None)` drops it, `Err` aborts the task.
/// Parameters are bound when the transform is built, before any record is
/// processed; only genuine per-record failures surface from `evaluate`.
///
/// Implementations must be `Send + Sync`; the shared context is the only
/// mutable state a stage may touch, and stages within one task run
/// strictly sequentially.
pub trait Transform: Send + Sync {
    /// Returns the registered name of this transform for logging.
    fn name(&self) -> &str;

    /// Applies the transform to one record.
    fn evaluate(&self, record: Record, ctx: &mut TransformContext) -> Result<Option<Record>>;
}

/// One configured transformer bound to its resolved implementation.
pub struct TransformerExecution {
    name: String,
    paras: Vec<String>,
    transform: Box<dyn Transform>,
}

impl TransformerExecution {
    /// Returns the configured transformer name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for TransformerExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerExecution")
            .field("name", &self.name)
            .field("paras", &self.paras)
            .finish_non_exhaustive()
    }
}

/// Counters kept while a pipeline runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records that passed every stage.
    pub success: u64,

    /// Records vetoed by a stage.
    pub filtered: u64,

    /// Records whose evaluation raised an error.
    pub failed: u64,
}

/// The ordered transform chain applied to each record before it is handed
/// to the channel.
///
/// Owned by a single task; the shared context needs no locking because
/// stages execute strictly sequentially within that task.
#[derive(Debug, Default)]
pub struct TransformerPipeline {
    executions: Vec<TransformerExecution>,
    context: TransformContext,
    stats: PipelineStats,
}

impl TransformerPipeline {
    /// Creates a pipeline with no stages; `apply` passes records through.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the pipeline for one job from its configured entries.
    ///
    /// Validates up front, before any record is processed: names must be
    /// non-empty, the scripted transform may appear at most once, every
    /// name must resolve in the registry, and each entry's parameters
    /// must bind. Per-entry context maps merge into the single shared
    /// context in configured order.
    ///
    /// # Errors
    ///
    /// Configuration and required-value errors abort task startup.
    pub fn build(registry: &TransformerRegistry, specs: &[TransformerSpec]) -> Result<Self> {
        let mut script_seen = false;
        for spec in specs {
            if spec.name.is_empty() {
                return Err(RfError::Config(
                    "transformer entry without a name".to_string(),
                ));
            }
            if spec.name == SCRIPT_NAME {
                if script_seen {
                    return Err(RfError::Config(format!(
                        "{SCRIPT_NAME} can be invoked once only"
                    )));
                }
                script_seen = true;
            }
        }

        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        info!(transformers = ?names, "Loading configured transformers");

        let mut executions = Vec::with_capacity(specs.len());
        let mut context = TransformContext::new();

        for (position, spec) in specs.iter().enumerate() {
            let builder = registry
                .get(&spec.name)
                .ok_or_else(|| RfError::RequiredValue(format!("name={}", spec.name)))?;

            let transform = builder(spec)?;
            context.extend(spec.context.clone());

            debug!(
                position,
                name = %spec.name,
                paras = ?spec.paras,
                "Transformer init success"
            );

            executions.push(TransformerExecution {
                name: spec.name.clone(),
                paras: spec.paras.clone(),
                transform,
            });
        }

        Ok(Self {
            executions,
            context,
            stats: PipelineStats::default(),
        })
    }

    /// Returns true when no stages are configured.
    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }

    /// Number of configured stages.
    pub fn len(&self) -> usize {
        self.executions.len()
    }

    /// Runs the record through every stage in configured order.
    ///
    /// The same record object threads forward. As soon as a stage drops
    /// the record, evaluation stops; later stages never see it. Stage
    /// errors are wrapped with the transformer name and parameter list,
    /// then re-raised.
    pub fn apply(&mut self, record: Record) -> Result<Option<Record>> {
        let mut current = record;
        for execution in &self.executions {
            match execution.transform.evaluate(current, &mut self.context) {
                Ok(Some(next)) => current = next,
                Ok(None) => {
                    self.stats.filtered += 1;
                    return Ok(None);
                }
                Err(e) => {
                    self.stats.failed += 1;
                    return Err(TransformError::Execution(format!(
                        "transformer {} paras {:?} => {e}",
                        execution.name, execution.paras
                    ))
                    .into());
                }
            }
        }
        self.stats.success += 1;
        Ok(Some(current))
    }

    /// Snapshot of the pipeline counters.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Read access to the shared execution context.
    pub fn context(&self) -> &TransformContext {
        &self.context
    }
}
