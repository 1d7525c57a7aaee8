//! `$ref` resolution
//!
//! This module handles:
//! - Splitting a reference into target document and JSON Pointer fragment
//! - Joining relative references against the current resolution scope
//! - Loading remote documents through the configured fetcher (once each)
//! - Evaluating JSON Pointers against raw documents
//!
//! Compiling the located sub-schema is the compiler's job; see
//! [`Compiler::resolve_reference`](crate::schema::Compiler).
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::error::{CompileError, CompileResult};
use crate::loader::cache::{CacheStats, ReferenceCache};
use crate::loader::fetch::SchemaFetcher;
use crate::loader::parser::{Format, SchemaParser};
use crate::schema::NodeId;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Resolution scope: which document a reference is relative to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The document being compiled
    Local,
    /// A fetched document, identified by its URI without fragment
    Remote(Url),
}

impl Scope {
    /// Cache key for this document
    pub fn document_key(&self) -> &str {
        match self {
            Scope::Local => "#",
            Scope::Remote(uri) => uri.as_str(),
        }
    }

    /// Absolute reference key for a fragment of this document
    pub fn key(&self, fragment: &str) -> String {
        match self {
            Scope::Local => format!("#{}", fragment),
            Scope::Remote(uri) if fragment.is_empty() => uri.to_string(),
            Scope::Remote(uri) => format!("{}#{}", uri, fragment),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Scope::Local)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.document_key())
    }
}

/// A parsed reference: target document, pointer, absolute cache key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTarget {
    pub document: Scope,
    /// Percent-decoded JSON Pointer, empty for the document root
    pub pointer: String,
    /// Built from the decoded pointer, so equivalent spellings share a key
    pub key: String,
}

/// Reference resolver shared by every node of one compilation pass
pub struct ReferenceResolver {
    cache: ReferenceCache,
    fetcher: Arc<dyn SchemaFetcher>,
    base_uri: Option<Url>,
    parser: SchemaParser,
}

impl fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceResolver")
            .field("cache", &self.cache)
            .field("base_uri", &self.base_uri)
            .finish_non_exhaustive()
    }
}

impl ReferenceResolver {
    /// Create a resolver for a local root document
    ///
    /// `base_uri`, when set, is the URI the local document is known by; it
    /// anchors relative references made from the local document.
    pub fn new(root: Value, fetcher: Arc<dyn SchemaFetcher>, base_uri: Option<Url>) -> Self {
        let mut cache = ReferenceCache::new();
        cache.insert_document(Scope::Local.document_key().to_string(), root, false);
        let base_uri = base_uri.map(|mut uri| {
            uri.set_fragment(None);
            uri
        });
        Self {
            cache,
            fetcher,
            base_uri,
            parser: SchemaParser::new(),
        }
    }

    /// The local root document
    pub fn root(&self) -> Arc<Value> {
        self.cache
            .document(Scope::Local.document_key())
            .unwrap_or_else(|| Arc::new(Value::Null))
    }

    /// Split a reference made from `scope` into its target
    pub fn parse(&self, reference: &str, scope: &Scope) -> CompileResult<ReferenceTarget> {
        if let Some(fragment) = reference.strip_prefix('#') {
            return self.target(scope.clone(), fragment, reference, scope);
        }

        let absolute = match Url::parse(reference) {
            Ok(uri) => uri,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = match scope {
                    Scope::Remote(uri) => Some(uri),
                    Scope::Local => self.base_uri.as_ref(),
                };
                let base = base.ok_or_else(|| {
                    CompileError::reference(reference, scope, "relative reference without a base URI")
                })?;
                base.join(reference)
                    .map_err(|e| CompileError::reference(reference, scope, e.to_string()))?
            }
            Err(e) => return Err(CompileError::reference(reference, scope, e.to_string())),
        };

        let fragment = absolute.fragment().unwrap_or("").to_string();
        let mut document = absolute;
        document.set_fragment(None);

        let document = if self.base_uri.as_ref() == Some(&document) {
            Scope::Local
        } else {
            Scope::Remote(document)
        };
        self.target(document, &fragment, reference, scope)
    }

    fn target(
        &self,
        document: Scope,
        fragment: &str,
        reference: &str,
        scope: &Scope,
    ) -> CompileResult<ReferenceTarget> {
        let pointer = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|e| CompileError::reference(reference, scope, e.to_string()))?
            .into_owned();

        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(CompileError::reference(
                reference,
                scope,
                "fragment must be empty or a JSON pointer starting with '/'",
            ));
        }

        Ok(ReferenceTarget {
            key: document.key(&pointer),
            document,
            pointer,
        })
    }

    /// Node already compiled (or reserved) for a key
    pub fn cached(&mut self, key: &str) -> Option<NodeId> {
        let found = self.cache.node(key);
        if found.is_some() {
            tracing::trace!(reference = key, "reference cache hit");
        }
        found
    }

    /// Register the node reserved for a key before its target compiles
    pub fn register(&mut self, key: String, id: NodeId) {
        self.cache.insert_node(key, id);
    }

    /// Raw JSON of a document, fetching remote documents at most once
    pub fn document(&mut self, document: &Scope, reference: &str, scope: &Scope) -> CompileResult<Arc<Value>> {
        if let Some(loaded) = self.cache.document(document.document_key()) {
            return Ok(loaded);
        }

        let uri = match document {
            Scope::Remote(uri) => uri,
            Scope::Local => {
                return Err(CompileError::reference(reference, scope, "local document is not loaded"))
            }
        };

        tracing::debug!(uri = %uri, "loading remote schema document");
        let bytes = self
            .fetcher
            .fetch(uri)
            .map_err(|e| CompileError::reference(reference, scope, format!("fetch failed: {}", e)))?;

        let format = uri
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, extension)| Format::from_extension(extension))
            .unwrap_or(Format::Json);

        let parsed = self.parser.parse_bytes(&bytes, format).map_err(|e| {
            CompileError::reference(reference, scope, format!("malformed remote document: {}", e))
        })?;

        Ok(self.cache.insert_document(uri.to_string(), parsed, true))
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Apply a decoded JSON pointer to a document
pub fn apply_json_pointer<'a>(
    document: &'a Value,
    pointer: &str,
    reference: &str,
    scope: &Scope,
) -> CompileResult<&'a Value> {
    if pointer.is_empty() {
        return Ok(document);
    }

    let mut current = document;
    // Skip the first empty segment
    for segment in pointer.split('/').skip(1) {
        let decoded_segment = segment.replace("~1", "/").replace("~0", "~");

        current = match current {
            Value::Object(obj) => obj.get(&decoded_segment).ok_or_else(|| {
                CompileError::reference(reference, scope, format!("Property '{}' not found", decoded_segment))
            })?,
            Value::Array(arr) => {
                let index = parse_index(&decoded_segment).ok_or_else(|| {
                    CompileError::reference(
                        reference,
                        scope,
                        format!("Invalid array index '{}'", decoded_segment),
                    )
                })?;
                arr.get(index).ok_or_else(|| {
                    CompileError::reference(reference, scope, format!("Array index {} out of bounds", index))
                })?
            }
            _ => {
                return Err(CompileError::reference(
                    reference,
                    scope,
                    format!("Cannot access property '{}' on non-object/array", decoded_segment),
                ))
            }
        };
    }

    Ok(current)
}

/// Array index token: decimal digits, no leading zero
fn parse_index(token: &str) -> Option<usize> {
    let well_formed = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if well_formed {
        token.parse().ok()
    } else {
        None
    }
}
