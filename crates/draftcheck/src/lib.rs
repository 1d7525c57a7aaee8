//! Draftcheck - JSON Schema draft-3/draft-4 compiler and validator
//!
//! A schema document is compiled once into an immutable constraint graph;
//! instances are then checked against it with a pass/fail answer.
//!
//! ## Features
//!
//! - **Draft-4 keyword set**, plus draft-3 `divisibleBy`, `extends`,
//!   `disallow` and boolean `required`
//! - **`$ref` resolution**: local JSON Pointers, remote documents through a
//!   pluggable [`SchemaFetcher`], relative references against a base URI
//! - **Recursive schemas**: references compile to arena indices, so cyclic
//!   `$ref` graphs are plain edges
//! - **Shareable validators**: [`Validator`] is `Send + Sync + Clone`
//!
//! ## Quick Start
//!
//! ```rust
//! use draftcheck::{Validator, ValidatorConfig, NoFetcher};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["id"],
//!     "properties": {
//!         "id": {"type": "integer"},
//!         "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true}
//!     },
//!     "additionalProperties": false
//! });
//!
//! let validator = Validator::from_value(&schema, ValidatorConfig::new().with_fetcher(NoFetcher)).unwrap();
//!
//! assert!(validator.is_valid(&json!({"id": 7, "tags": ["a", "b"]})));
//! assert!(!validator.is_valid(&json!({"id": 7, "tags": ["a", "a"]})));
//! assert!(!validator.is_valid(&json!({"id": "7"})));
//! ```
//!
//! ## Feature flags
//!
//! - `http` (default): [`HttpFetcher`] backed by a blocking `reqwest` client
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

pub mod draft;
pub mod error;
pub mod loader;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

// Re-export commonly used types for convenience
pub use draft::Draft;
pub use error::{CompileError, CompileResult, DecodeError, FetchError};
#[cfg(feature = "http")]
pub use loader::HttpFetcher;
pub use loader::{CacheStats, FileFetcher, NoFetcher, SchemaFetcher, Scope, StaticFetcher};
pub use types::{PrimitiveType, TypeSet};
pub use validation::{Validator, ValidatorConfig};
