//! Error types for the harvester.
//!
//! Protocol and transport failures get their own variants; record parsing
//! and mapping failures from the core crate are wrapped in [`HarvesterError::Core`].

use crosswalk_core::CrosswalkError;
use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Operation the protocol cannot answer cheaply.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Transient failures persisted through every retry.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// The repository answered with something other than XML.
    #[error("Expected an XML response from {url}, got '{content_type}'")]
    ContentType { url: String, content_type: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The repository answered with an OAI-PMH error.
    #[error("OAI-PMH error '{code}': {message}")]
    OaiProtocol { code: String, message: String },

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// Endpoint is not an absolute http(s) URL.
    #[error("Invalid endpoint URL: '{0}'")]
    InvalidEndpoint(String),

    /// Metadata prefix contains characters OAI-PMH does not allow.
    #[error("Invalid metadata prefix: '{0}'")]
    InvalidMetadataPrefix(String),

    /// Datestamp is neither YYYY-MM-DD nor YYYY-MM-DDThh:mm:ssZ.
    #[error("Invalid datestamp: '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ")]
    InvalidDatestamp(String),

    /// Harvest source file could not be read as YAML.
    #[error("Invalid harvest source: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record parsing or mapping failed.
    #[error(transparent)]
    Core(#[from] CrosswalkError),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
