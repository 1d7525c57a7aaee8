//! Primitive type matching for the `type` and `disallow` keywords
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::error::{CompileError, CompileResult};
use crate::value::{self, JsonKind};
use serde_json::Value;
use std::fmt;

/// A JSON Schema primitive type token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Number,
    Integer,
    String,
    Array,
    Object,
    Null,
    Any,
}

static TYPE_NAMES: &[(&str, PrimitiveType)] = &[
    ("boolean", PrimitiveType::Boolean),
    ("number", PrimitiveType::Number),
    ("integer", PrimitiveType::Integer),
    ("string", PrimitiveType::String),
    ("array", PrimitiveType::Array),
    ("object", PrimitiveType::Object),
    ("null", PrimitiveType::Null),
    ("any", PrimitiveType::Any),
];

impl PrimitiveType {
    /// Look up a type token
    pub fn from_name(name: &str) -> CompileResult<Self> {
        TYPE_NAMES
            .iter()
            .find(|(token, _)| *token == name)
            .map(|(_, ty)| *ty)
            .ok_or_else(|| CompileError::unknown_type(name))
    }

    pub fn name(&self) -> &'static str {
        TYPE_NAMES
            .iter()
            .find(|(_, ty)| ty == self)
            .map(|(token, _)| *token)
            .unwrap_or("any")
    }

    /// Check whether a value is of this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Integer => value::number(value).is_some_and(value::is_whole),
            Self::Boolean => JsonKind::of(value) == JsonKind::Bool,
            Self::Number => JsonKind::of(value) == JsonKind::Number,
            Self::String => JsonKind::of(value) == JsonKind::String,
            Self::Array => JsonKind::of(value) == JsonKind::Array,
            Self::Object => JsonKind::of(value) == JsonKind::Object,
            Self::Null => JsonKind::of(value) == JsonKind::Null,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Union of accepted types; empty accepts everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSet {
    types: Vec<PrimitiveType>,
}

impl TypeSet {
    /// The set that accepts every value
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse the value of a `type`-like keyword: a name or an array of names
    pub fn from_value(keyword: &str, value: &Value) -> CompileResult<Self> {
        let mut types = Vec::new();
        match value {
            Value::String(name) => types.push(PrimitiveType::from_name(name)?),
            Value::Array(names) => {
                for entry in names {
                    let name = entry.as_str().ok_or_else(|| {
                        CompileError::invalid(keyword, "array entries must be type names")
                    })?;
                    types.push(PrimitiveType::from_name(name)?);
                }
            }
            _ => {
                return Err(CompileError::invalid(
                    keyword,
                    "must be a type name or an array of type names",
                ))
            }
        }
        Ok(Self { types })
    }

    /// Check whether any member accepts the value
    pub fn matches(&self, value: &Value) -> bool {
        self.types.is_empty() || self.types.iter().any(|ty| ty.matches(value))
    }
}
