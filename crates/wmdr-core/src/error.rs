//! Error types and exit codes for wmdr
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args, unknown rule id)
//! - 3: Data error (unreadable record, not a WMDR document, missing resources)
//!
//! Missing or malformed values inside a record are never errors; they become
//! rule comments. Only failures that prevent evaluating a record at all are
//! represented here.

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - unreadable record, missing resources (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur while loading resources or evaluating records
#[derive(Error, Debug)]
pub enum WmdrError {
    // Usage errors (exit code 2)
    #[error("--format may only be specified once")]
    DuplicateFormat,

    #[error("{0}")]
    UsageError(String),

    #[error("unknown rule: {id} (known: {known})")]
    UnknownRule { id: String, known: String },

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data errors (exit code 3)
    #[error("document structure error: {reason}")]
    DocumentStructure { reason: String },

    #[error("XML syntax error: {0}")]
    XmlSyntax(#[from] roxmltree::Error),

    #[error("failed to load resource {path:?}: {reason}")]
    Resource { path: PathBuf, reason: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl WmdrError {
    /// Create an error for a record that is not a WMDR document
    pub fn not_wmdr() -> Self {
        WmdrError::DocumentStructure {
            reason: "Does not look like a WMDR document".to_string(),
        }
    }

    /// Create an error for a resource file that could not be loaded
    pub fn resource(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        WmdrError::Resource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        WmdrError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        WmdrError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        WmdrError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            WmdrError::DuplicateFormat
            | WmdrError::UsageError(_)
            | WmdrError::UnknownRule { .. }
            | WmdrError::InvalidValue { .. } => ExitCode::Usage,

            WmdrError::DocumentStructure { .. }
            | WmdrError::XmlSyntax(_)
            | WmdrError::Resource { .. }
            | WmdrError::NotFound { .. } => ExitCode::Data,

            WmdrError::Io(_)
            | WmdrError::Json(_)
            | WmdrError::Toml(_)
            | WmdrError::FailedOperationWithTarget { .. }
            | WmdrError::Other(_) => ExitCode::Failure,
        }
    }

    /// Whether a batch may skip the offending record and carry on
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            WmdrError::DocumentStructure { .. }
                | WmdrError::XmlSyntax(_)
                | WmdrError::FailedOperationWithTarget { .. }
        )
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            WmdrError::DuplicateFormat => "duplicate_format",
            WmdrError::UsageError(_) => "usage_error",
            WmdrError::UnknownRule { .. } => "unknown_rule",
            WmdrError::InvalidValue { .. } => "invalid_value",
            WmdrError::DocumentStructure { .. } => "document_structure",
            WmdrError::XmlSyntax(_) => "xml_syntax",
            WmdrError::Resource { .. } => "resource_error",
            WmdrError::NotFound { .. } => "not_found",
            WmdrError::Io(_) => "io_error",
            WmdrError::Json(_) => "json_error",
            WmdrError::Toml(_) => "toml_error",
            WmdrError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            WmdrError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for `--format json` output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for wmdr operations
pub type Result<T> = std::result::Result<T, WmdrError>;
