//! Compiled validator facade
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::draft::Draft;
use crate::error::{CompileError, CompileResult, DecodeError};
use crate::loader::{CacheStats, ReferenceResolver, SchemaParser};
use crate::schema::{Compiler, NodeId, SchemaArena};
use crate::validation::{Evaluator, ValidatorConfig};
use crate::value;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// A compiled schema, ready to check instances
///
/// Cloning is cheap; clones share the compiled arena.
#[derive(Debug, Clone)]
pub struct Validator {
    arena: Arc<SchemaArena>,
    root: NodeId,
    draft: Draft,
    stats: CacheStats,
}

impl Validator {
    /// Compile schema bytes with the default configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use draftcheck::Validator;
    ///
    /// let validator = Validator::compile(br#"{"type": "integer", "minimum": 1}"#).unwrap();
    /// assert!(validator.validate(b"3").unwrap());
    /// assert!(!validator.validate(b"0").unwrap());
    /// assert!(validator.validate(b"{oops").is_err());
    /// ```
    pub fn compile(schema: &[u8]) -> CompileResult<Self> {
        Self::compile_with(schema, ValidatorConfig::default())
    }

    pub fn compile_with(schema: &[u8], config: ValidatorConfig) -> CompileResult<Self> {
        let schema = value::decode(schema)?;
        Self::from_value(&schema, config)
    }

    /// Compile an already decoded schema document
    pub fn from_value(schema: &Value, config: ValidatorConfig) -> CompileResult<Self> {
        let draft = config.draft.unwrap_or_else(|| Draft::for_schema(schema));
        let resolver = ReferenceResolver::new(schema.clone(), config.fetcher, config.base_uri);
        let compiled = Compiler::new(resolver, draft)
            .with_max_depth(config.max_depth)
            .compile()?;

        Ok(Self {
            arena: Arc::new(compiled.arena),
            root: compiled.root,
            draft: compiled.draft,
            stats: compiled.stats,
        })
    }

    /// Compile a JSON or YAML schema file
    ///
    /// Unless the configuration names a base URI, relative references are
    /// resolved against the file's own `file://` URI.
    pub fn from_path<P: AsRef<Path>>(path: P, mut config: ValidatorConfig) -> CompileResult<Self> {
        let path = path.as_ref();
        let schema = SchemaParser::new().parse_file(path)?;
        if config.base_uri.is_none() {
            let absolute = path
                .canonicalize()
                .map_err(|e| CompileError::io_error(path.to_path_buf(), e))?;
            config.base_uri = Url::from_file_path(absolute).ok();
        }
        Self::from_value(&schema, config)
    }

    /// Decode an instance and check it
    ///
    /// Malformed JSON is an error; a well-formed nonconforming instance is `Ok(false)`.
    pub fn validate(&self, instance: &[u8]) -> Result<bool, DecodeError> {
        let instance = value::decode(instance)?;
        Ok(self.is_valid(&instance))
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        Evaluator::new(&self.arena).is_valid(self.root, instance)
    }

    /// Check several instances, one result per instance
    pub fn validate_batch(&self, instances: &[Value]) -> Vec<bool> {
        let evaluator = Evaluator::new(&self.arena);
        instances
            .iter()
            .map(|instance| evaluator.is_valid(self.root, instance))
            .collect()
    }

    /// Draft the schema was compiled under
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// Number of nodes in the compiled arena
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Reference cache counters from the compilation pass
    pub fn cache_stats(&self) -> &CacheStats {
        &self.stats
    }
}
