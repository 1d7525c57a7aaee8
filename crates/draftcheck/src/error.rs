//! Error types for schema compilation and instance decoding
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for compile operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Error reported by a [`SchemaFetcher`](crate::loader::SchemaFetcher) collaborator
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Malformed input text
#[derive(Error, Debug)]
pub enum DecodeError {
    /// JSON parsing errors
    #[error("Malformed JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("Malformed YAML: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
}

/// Everything that can abort compilation of a schema
#[derive(Error, Debug)]
pub enum CompileError {
    /// The schema text itself could not be decoded
    #[error("Failed to decode schema: {0}")]
    Decode(#[from] DecodeError),

    /// `type` (or `disallow`) named a type that does not exist
    #[error("Unknown type name '{name}'")]
    UnknownType { name: String },

    /// A keyword carried the wrong JSON type or an invalid combination
    #[error("Invalid schema format for '{keyword}': {reason}")]
    InvalidSchemaFormat { keyword: String, reason: String },

    /// `$ref` could not be resolved
    #[error("Failed to resolve reference '{reference}' in scope '{scope}': {reason}")]
    Reference {
        reference: String,
        scope: String,
        reason: String,
    },

    /// File I/O errors while loading a schema by path
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },
}

impl CompileError {
    /// Create an unknown type error
    pub fn unknown_type<N: Into<String>>(name: N) -> Self {
        Self::UnknownType { name: name.into() }
    }

    /// Create an invalid schema format error
    pub fn invalid<K, R>(keyword: K, reason: R) -> Self
    where
        K: Into<String>,
        R: Into<String>,
    {
        Self::InvalidSchemaFormat {
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }

    /// Create a reference resolution error
    pub fn reference<R, S, M>(reference: R, scope: S, reason: M) -> Self
    where
        R: Into<String>,
        S: ToString,
        M: Into<String>,
    {
        Self::Reference {
            reference: reference.into(),
            scope: scope.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::Io {
            path,
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    /// The keyword involved, for format errors
    pub fn keyword(&self) -> Option<&str> {
        match self {
            Self::InvalidSchemaFormat { keyword, .. } => Some(keyword),
            _ => None,
        }
    }

    /// Check if this error came from `$ref` resolution
    pub fn is_reference_error(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }
}
