//! Registry of named transform functions.

use crate::config::TransformerSpec;
use crate::execution::Transform;
use crate::{filter, script, strings};
use rf_error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Built-in comparison/filter operator.
pub const FILTER_NAME: &str = "rf_filter";

/// Built-in substring transform.
pub const SUBSTR_NAME: &str = "rf_substr";

/// Built-in segment-replace transform.
pub const REPLACE_NAME: &str = "rf_replace";

/// Built-in padding transform.
pub const PAD_NAME: &str = "rf_pad";

/// The reserved whole-row scripted transform. At most one per job.
pub const SCRIPT_NAME: &str = "rf_script";

/// Builds a bound transform from one configured entry.
///
/// Builders validate and pre-parse parameters, so a malformed entry fails
/// here, at job initialization, never during record processing.
pub type TransformBuilder = Arc<dyn Fn(&TransformerSpec) -> Result<Box<dyn Transform>> + Send + Sync>;

/// Maps transformer names to their builders.
///
/// Pre-populated with the built-ins; externally supplied native functions
/// join through [`register`](TransformerRegistry::register). Populated
/// once at job start and read-only afterwards.
pub struct TransformerRegistry {
    builders: HashMap<String, TransformBuilder>,
}

impl TransformerRegistry {
    /// Creates a registry holding the built-in transforms.
    pub fn new() -> Self {
        let mut registry = Self {
            builders: HashMap::new(),
        };
        registry.register(FILTER_NAME, Arc::new(filter::build));
        registry.register(SUBSTR_NAME, Arc::new(strings::build_substr));
        registry.register(REPLACE_NAME, Arc::new(strings::build_replace));
        registry.register(PAD_NAME, Arc::new(strings::build_pad));
        registry.register(SCRIPT_NAME, Arc::new(script::build));
        registry
    }

    /// Registers a builder under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, builder: TransformBuilder) {
        self.builders.insert(name.into(), builder);
    }

    /// Looks up the builder for `name`.
    pub fn get(&self, name: &str) -> Option<&TransformBuilder> {
        self.builders.get(name)
    }

    /// Returns true when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
