//! Error types for schema overlays, document loading, and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the requirement overlay engine.
///
/// Malformed configuration is never an error; only a top-level schema the
/// engine cannot descend into is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
    #[error("the given schema must be an object schema, got {kind}")]
    InvalidSchemaKind { kind: &'static str },
}

impl OverlayError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading and dereferencing an interchange document.
#[derive(Debug, Error)]
pub enum DocumentError {
    // IO errors (exit code 3)
    #[error("error reading OpenAPI document: file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("error reading OpenAPI document: cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("error reading OpenAPI document: failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[cfg(not(feature = "remote"))]
    #[error("error reading OpenAPI document: HTTP fetching requires 'remote' feature: {url}")]
    RemoteDisabled { url: String },

    // Parse errors (exit code 2)
    #[error("error reading OpenAPI document: invalid YAML/JSON: {source}")]
    InvalidDocument {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("error reading OpenAPI document: unexpected document shape: {source}")]
    InvalidShape {
        #[source]
        source: serde_json::Error,
    },

    #[error("error reading OpenAPI document: unresolved $ref {reference}")]
    UnresolvedRef { reference: String },

    #[error("error reading OpenAPI document: circular $ref {reference}")]
    CircularRef { reference: String },

    #[error("error reading OpenAPI document: no component schema named {name}")]
    MissingComponent { name: String },
}

impl DocumentError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DocumentError::FileNotFound { .. } | DocumentError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            DocumentError::NetworkError { .. } => 3,
            #[cfg(not(feature = "remote"))]
            DocumentError::RemoteDisabled { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }

    /// Paths of all validation failures, empty for schema errors.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            ValidateError::Invalid { errors } => errors.iter().map(|e| e.path.as_str()).collect(),
            ValidateError::InvalidSchema { .. } => Vec::new(),
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field. For a missing required
    /// field this points at the field itself, not its parent.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
