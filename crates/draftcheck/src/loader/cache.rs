//! Per-compilation cache of documents and resolved references
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::schema::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Documents and compiled references known to one compilation pass
///
/// Keys are absolute: `#` / `#/definitions/a` for the local document,
/// `http://host/doc.json` / `http://host/doc.json#/a` for remote ones.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    documents: HashMap<String, Arc<Value>>,
    nodes: HashMap<String, NodeId>,
    stats: CacheStats,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the node compiled (or being compiled) for a reference
    pub fn node(&mut self, key: &str) -> Option<NodeId> {
        let found = self.nodes.get(key).copied();
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    /// Register the node for a reference; the node may still be under construction
    pub fn insert_node(&mut self, key: String, id: NodeId) {
        self.nodes.insert(key, id);
        self.stats.references = self.nodes.len();
    }

    pub fn document(&self, uri: &str) -> Option<Arc<Value>> {
        self.documents.get(uri).cloned()
    }

    /// Register a document; `fetched` marks documents that crossed the fetcher
    pub fn insert_document(&mut self, uri: String, document: Value, fetched: bool) -> Arc<Value> {
        let document = Arc::new(document);
        self.documents.insert(uri, Arc::clone(&document));
        self.stats.documents = self.documents.len();
        if fetched {
            self.stats.fetches += 1;
        }
        document
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }
}

/// Counters describing one compilation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Documents loaded, including the local root
    pub documents: usize,
    /// Remote documents fetched
    pub fetches: usize,
    /// Distinct absolute references registered
    pub references: usize,
    /// Reference lookups answered from the cache
    pub hits: usize,
    /// Reference lookups that had to compile their target
    pub misses: usize,
}

impl CacheStats {
    /// Share of lookups answered from the cache, in percent
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            (self.hits as f64 / lookups as f64) * 100.0
        }
    }
}
