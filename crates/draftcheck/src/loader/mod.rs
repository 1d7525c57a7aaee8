//! Schema document loading and `$ref` resolution
//!
//! - [`parser`]: JSON/YAML decoding of schema files
//! - [`fetch`]: transports for remote documents
//! - [`cache`]: documents and compiled references of one compilation pass
//! - [`resolver`]: reference parsing and JSON Pointer evaluation
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod fetch;
pub mod parser;
pub mod resolver;

pub use cache::{CacheStats, ReferenceCache};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{default_fetcher, FileFetcher, NoFetcher, SchemaFetcher, StaticFetcher};
pub use parser::{Format, SchemaParser};
pub use resolver::{apply_json_pointer, ReferenceResolver, ReferenceTarget, Scope};
