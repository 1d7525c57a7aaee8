//! Draft detection from `$schema`
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Supported JSON Schema drafts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Draft {
    Draft3,
    #[default]
    Draft4,
}

impl Draft {
    /// Detect the draft a schema declares
    ///
    /// `None` when `$schema` is absent or names neither draft-03 nor draft-04.
    pub fn detect(schema: &Value) -> Option<Self> {
        let uri = schema.get("$schema")?.as_str()?;
        Self::from_uri(uri)
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        let trimmed = uri.trim_end_matches('#');
        let trimmed = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))?;
        match trimmed {
            "json-schema.org/draft-03/schema" => Some(Self::Draft3),
            "json-schema.org/draft-04/schema" => Some(Self::Draft4),
            _ => None,
        }
    }

    /// Draft to compile a schema under
    ///
    /// An unrecognised `$schema` falls back to draft-04 with a warning.
    pub fn for_schema(schema: &Value) -> Self {
        if let Some(draft) = Self::detect(schema) {
            return draft;
        }
        if let Some(uri) = schema.get("$schema").and_then(Value::as_str) {
            tracing::warn!(schema = uri, "unsupported $schema, compiling as draft-04");
        }
        Self::default()
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Self::Draft3 => "http://json-schema.org/draft-03/schema#",
            Self::Draft4 => "http://json-schema.org/draft-04/schema#",
        }
    }
}

impl fmt::Display for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft3 => f.write_str("draft-03"),
            Self::Draft4 => f.write_str("draft-04"),
        }
    }
}
