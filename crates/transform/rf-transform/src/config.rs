//! Configuration types for transformer entries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One configured transformer entry, in job-configured order.
///
/// Single-column built-ins use `column_index` plus `paras`; the scripted
/// transform uses `code` (or `code_file` as a fallback) plus
/// `extra_packages`. `context` seeds the mutable execution context shared
/// across the whole pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformerSpec {
    /// Registered transformer name.
    pub name: String,

    /// Target column for single-column built-ins.
    #[serde(default)]
    pub column_index: Option<usize>,

    /// Ordered string parameters.
    #[serde(default)]
    pub paras: Vec<String>,

    /// Seed entries for the shared execution context.
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,

    /// Inline script body (preferred over `code_file` when both are set).
    #[serde(default)]
    pub code: Option<String>,

    /// Path to a script file.
    #[serde(default)]
    pub code_file: Option<String>,

    /// Paths of auxiliary script files prepended to the body.
    #[serde(default)]
    pub extra_packages: Vec<String>,
}

impl TransformerSpec {
    /// Creates a spec for the named transformer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_index: None,
            paras: Vec::new(),
            context: HashMap::new(),
            code: None,
            code_file: None,
            extra_packages: Vec::new(),
        }
    }

    /// Sets the target column index.
    pub fn with_column_index(mut self, index: usize) -> Self {
        self.column_index = Some(index);
        self
    }

    /// Sets the ordered parameter list.
    pub fn with_paras<I, S>(mut self, paras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paras = paras.into_iter().map(Into::into).collect();
        self
    }

    /// Sets an inline script body.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets a script file path.
    pub fn with_code_file(mut self, path: impl Into<String>) -> Self {
        self.code_file = Some(path.into());
        self
    }

    /// Adds one seed entry to the shared execution context.
    pub fn with_context_entry(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Sets the auxiliary script file list.
    pub fn with_extra_packages<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_packages = paths.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let spec = TransformerSpec::new("rf_filter")
            .with_column_index(2)
            .with_paras([">=", "10"]);

        assert_eq!(spec.name, "rf_filter");
        assert_eq!(spec.column_index, Some(2));
        assert_eq!(spec.paras, vec![">=", "10"]);
        assert!(spec.code.is_none());
    }

    #[test]
    fn test_serde_defaults() {
        let spec: TransformerSpec = serde_json::from_str(r#"{"name": "rf_script"}"#).unwrap();
        assert_eq!(spec.name, "rf_script");
        assert_eq!(spec.column_index, None);
        assert!(spec.paras.is_empty());
        assert!(spec.extra_packages.is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let spec = TransformerSpec::new("rf_script")
            .with_code("record")
            .with_context_entry("region", serde_json::json!("eu"));

        let json = serde_json::to_string(&spec).unwrap();
        let parsed: TransformerSpec = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.name, spec.name);
        assert_eq!(parsed.code, spec.code);
        assert_eq!(parsed.context["region"], serde_json::json!("eu"));
    }
}
