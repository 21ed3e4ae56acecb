//! Error types for catalogo
//!
//! One error enum for the whole service. Controllers return it, the HTTP
//! layer turns it into a failure envelope with the matching status code.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Violations;

/// The main error type for catalogo operations
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Client errors
    // ==========================================================================
    #[error("Invalid data: {0}")]
    Validation(Violations),

    #[error("Invalid {kind} ID")]
    InvalidId { kind: &'static str, value: String },

    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // ==========================================================================
    // Store errors
    // ==========================================================================
    #[error("Failed to connect to the document store: {0}")]
    Connection(String),

    #[error("Document store is not connected")]
    NotConnected,

    #[error("Invalid {kind} '{value}': {reason}")]
    InvalidName {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Document '{id}' already exists in collection '{collection}'")]
    DuplicateId { collection: String, id: String },

    // ==========================================================================
    // IO Errors
    // ==========================================================================
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==========================================================================
    // Serialization Errors
    // ==========================================================================
    #[error("Malformed frontmatter: {0}")]
    Frontmatter(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==========================================================================
    // Catch-all
    // ==========================================================================
    #[error("{0}")]
    Other(String),
}

/// Result type alias for catalogo operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<crate::validation::NameError> for Error {
    fn from(err: crate::validation::NameError) -> Self {
        Error::InvalidName {
            kind: err.kind,
            value: err.value,
            reason: err.reason,
        }
    }
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// HTTP status code for this error
    pub fn status(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::InvalidId { .. } | Error::MalformedPayload(_) => 400,
            Error::NotFound { .. } => 404,
            _ => 500,
        }
    }

    /// True for failures caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        self.status() < 500
    }
}
