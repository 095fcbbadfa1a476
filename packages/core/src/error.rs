//! Error types for record parsing and mapping.

use thiserror::Error;

/// Main error type for the crosswalk core.
#[derive(Debug, Error)]
pub enum CrosswalkError {
    /// The configured root path matched nothing in the record.
    #[error("Root path '{root_path}' did not resolve to a node")]
    EmptyRootNode { root_path: String },

    /// Operation not available on this backend.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A subject declaration resolved to something other than one value.
    #[error("Subject must resolve to exactly one value, got {count}")]
    InvalidSubject { count: usize },

    /// Path expression could not be compiled or evaluated.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// JSON parsing failed.
    #[error("JSON parsing failed: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Record content type does not match the parser configuration.
    #[error("Content type mismatch: parser expects {expected}, record is {actual}")]
    ContentType { expected: String, actual: String },

    /// Schema name not among the known presets.
    #[error("Unknown schema '{0}'")]
    UnknownSchema(String),

    /// No mapping registered under this name.
    #[error("No mapping registered as '{0}'")]
    UnknownMapping(String),

    /// A declaration read a binding that is not in scope.
    #[error("Binding '{0}' is not in scope")]
    MissingBinding(String),

    /// A transform rejected its input.
    #[error("Transform failed: {0}")]
    Transform(String),
}

impl CrosswalkError {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for crosswalk operations.
pub type Result<T> = std::result::Result<T, CrosswalkError>;
