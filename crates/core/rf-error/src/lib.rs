//! Error types and classification for rowflow.
//!
//! This crate provides:
//! - [`RfError`] - Top-level error enum for all pipeline errors
//! - Domain-specific errors ([`RecordError`], [`TransformError`])
//! - Startup/runtime classification for task lifecycle decisions

use thiserror::Error;

/// Top-level error type for rowflow.
#[derive(Error, Debug)]
pub enum RfError {
    /// Configuration errors (bad or missing setup value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A mandatory option is absent
    #[error("Required value missing: {0}")]
    RequiredValue(String),

    /// A syntactically present but semantically invalid value
    #[error("Illegal value: {0}")]
    IllegalValue(String),

    /// Record and column errors (conversion, indexing)
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Transform errors (compilation, per-record execution)
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Operation attempted after the exchanger was shut down
    #[error("Task has been shut down")]
    Shutdown,

    /// I/O errors (script files, auxiliary resources)
    #[error("I/O error: {0}")]
    Io(String),
}

/// Record and column errors.
#[derive(Error, Debug)]
pub enum RecordError {
    /// A column value cannot be coerced to the requested representation
    #[error("Cannot convert {from} value `{value}` to {to}")]
    Conversion {
        from: &'static str,
        to: &'static str,
        value: String,
    },

    /// A column index points past the end of the record
    #[error("Column index {index} out of bounds for record with {len} columns")]
    ColumnOutOfBounds { index: usize, len: usize },
}

/// Transform errors.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Script compilation failed
    #[error("Script compilation failed: {0}")]
    Compilation(String),

    /// Per-record evaluation failed
    #[error("Transform execution failed: {0}")]
    Execution(String),
}

impl RfError {
    /// Returns true for errors that abort task startup rather than a
    /// single record: configuration, required-value and illegal-value
    /// errors, plus script compilation failures.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            RfError::Config(_)
                | RfError::RequiredValue(_)
                | RfError::IllegalValue(_)
                | RfError::Transform(TransformError::Compilation(_))
        )
    }
}

/// Result type alias using RfError.
pub type Result<T> = std::result::Result<T, RfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RfError::Record(RecordError::Conversion {
            from: "bytes",
            to: "long",
            value: "0xдeadbeef".to_string(),
        });
        assert!(error.to_string().contains("Cannot convert bytes"));

        let error = RfError::Shutdown;
        assert_eq!(error.to_string(), "Task has been shut down");
    }

    #[test]
    fn test_startup_classification() {
        assert!(RfError::Config("bad".to_string()).is_startup());
        assert!(RfError::RequiredValue("name".to_string()).is_startup());
        assert!(RfError::Transform(TransformError::Compilation("{{".to_string())).is_startup());
        assert!(!RfError::Transform(TransformError::Execution("boom".to_string())).is_startup());
        assert!(!RfError::Shutdown.is_startup());
    }

    #[test]
    fn test_from_domain_errors() {
        let error: RfError = RecordError::ColumnOutOfBounds { index: 7, len: 3 }.into();
        assert!(matches!(error, RfError::Record(_)));

        let error: RfError = TransformError::Execution("row 9".to_string()).into();
        assert!(matches!(error, RfError::Transform(_)));
    }
}
