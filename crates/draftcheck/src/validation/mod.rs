//! Instance validation against compiled schemas
//!
//! [`Validator`] is the public entry point: compile once, then call
//! [`Validator::validate`] or [`Validator::is_valid`] from any number of
//! threads. [`ValidatorConfig`] controls how compilation resolves `$ref`.
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

pub mod evaluator;
pub mod validator;

pub use evaluator::Evaluator;
pub use validator::Validator;

use crate::draft::Draft;
use crate::loader::{default_fetcher, SchemaFetcher};
use crate::schema::DEFAULT_MAX_DEPTH;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Compilation settings
#[derive(Clone)]
pub struct ValidatorConfig {
    /// Transport for remote `$ref` documents
    pub fetcher: Arc<dyn SchemaFetcher>,
    /// URI the compiled document is known by; anchors relative references
    pub base_uri: Option<Url>,
    /// Maximum schema nesting depth
    pub max_depth: usize,
    /// Draft override; detected from `$schema` when unset
    pub draft: Option<Draft>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            fetcher: default_fetcher(),
            base_uri: None,
            max_depth: DEFAULT_MAX_DEPTH,
            draft: None,
        }
    }
}

impl fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("base_uri", &self.base_uri)
            .field("max_depth", &self.max_depth)
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom fetcher for remote references
    pub fn with_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: SchemaFetcher + 'static,
    {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Share an already boxed fetcher
    pub fn with_shared_fetcher(mut self, fetcher: Arc<dyn SchemaFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_base_uri(mut self, base_uri: Url) -> Self {
        self.base_uri = Some(base_uri);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Compile under this draft regardless of `$schema`
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }
}
