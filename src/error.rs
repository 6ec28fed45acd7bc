//! Error types for schema compilation, reference resolution and document loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors during schema compilation.
///
/// Compilation is all-or-nothing: the first error aborts the whole compile.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("schema at {path} must be an object, got {actual}")]
    NotAnObject { path: String, actual: String },

    #[error("keyword '{keyword}' at {path} must be {expected}, got {actual}")]
    WrongType {
        path: String,
        keyword: String,
        expected: &'static str,
        actual: String,
    },

    #[error("'{name}' at {path} is not a valid JSON Schema type")]
    UnknownType { path: String, name: String },

    #[error("schema at {path} declares both 'const' and 'enum'")]
    ConstAndEnum { path: String },

    #[error("keyword '{keyword}' at {path} must be non-negative, got {value}")]
    Negative {
        path: String,
        keyword: String,
        value: i64,
    },

    #[error("'multipleOf' at {path} must be positive, got {value}")]
    NonPositiveMultipleOf { path: String, value: f64 },

    #[error("anchor '{anchor}' at {path} is already declared in the same document")]
    DuplicateAnchor { path: String, anchor: String },

    #[error("unsupported $schema version: {uri}")]
    UnsupportedVersion { uri: String },
}

impl CompileError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while following a `$ref`.
///
/// These never abort a validation run; the engine turns them into internal
/// diagnostics for the node that carried the reference.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    #[error("unsupported reference '{reference}'")]
    Unsupported { reference: String },

    #[error("schema '{document}' does not define shared '$defs' for '{reference}'")]
    MissingDefinitions { reference: String, document: String },

    #[error("reference '{reference}' does not resolve against '$defs'")]
    DefinitionNotFound { reference: String },

    #[error("reference '{reference}' names unknown schema document '{document}'")]
    UnknownDocument { reference: String, document: String },

    #[error("anchor '{anchor}' of reference '{reference}' not found")]
    AnchorNotFound { reference: String, anchor: String },

    #[error("reference '{reference}' is relative but the enclosing schema has no $id")]
    NoBaseUri { reference: String },

    #[error("reference cycle detected at '{reference}'")]
    Cycle { reference: String },
}

/// Errors while loading a JSON or YAML document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}
