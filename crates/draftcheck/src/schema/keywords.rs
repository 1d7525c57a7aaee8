//! Independent keyword constraints
//!
//! Each variant declares the JSON kind it constrains; a value of any other
//! kind passes before the variant-specific check runs.
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::schema::NodeId;
use crate::types::TypeSet;
use crate::validation::Evaluator;
use crate::value::{self, JsonKind};
use regex::Regex;
use serde_json::Value;

/// Lower or upper limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    fn admits(&self, actual: usize, limit: usize) -> bool {
        match self {
            Bound::Min => actual >= limit,
            Bound::Max => actual <= limit,
        }
    }
}

/// What the presence of a dependent property demands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRequirement {
    /// Sibling keys that must be present too
    Properties(Vec<String>),
    /// Schema the whole instance must satisfy
    Schema(NodeId),
}

#[derive(Debug, Clone)]
pub enum KeywordConstraint {
    Bounds {
        bound: Bound,
        limit: f64,
        exclusive: bool,
    },
    Length {
        bound: Bound,
        limit: usize,
    },
    ItemCount {
        bound: Bound,
        limit: usize,
    },
    PropertyCount {
        bound: Bound,
        limit: usize,
    },
    Pattern(Regex),
    UniqueItems(bool),
    Required(Vec<String>),
    Dependency {
        property: String,
        requirement: DependencyRequirement,
    },
    Enum(Vec<Value>),
    MultipleOf(f64),
    /// draft-3: the value must match none of these types
    Disallow(TypeSet),
}

impl KeywordConstraint {
    /// Kind of value this constraint looks at; `None` for every kind
    pub fn applies_to(&self) -> Option<JsonKind> {
        match self {
            Self::Bounds { .. } | Self::MultipleOf(_) => Some(JsonKind::Number),
            Self::Length { .. } | Self::Pattern(_) => Some(JsonKind::String),
            Self::ItemCount { .. } | Self::UniqueItems(_) => Some(JsonKind::Array),
            Self::PropertyCount { .. } | Self::Required(_) | Self::Dependency { .. } => {
                Some(JsonKind::Object)
            }
            Self::Enum(_) | Self::Disallow(_) => None,
        }
    }

    /// The keyword this constraint was compiled from
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Bounds { bound: Bound::Min, .. } => "minimum",
            Self::Bounds { bound: Bound::Max, .. } => "maximum",
            Self::Length { bound: Bound::Min, .. } => "minLength",
            Self::Length { bound: Bound::Max, .. } => "maxLength",
            Self::ItemCount { bound: Bound::Min, .. } => "minItems",
            Self::ItemCount { bound: Bound::Max, .. } => "maxItems",
            Self::PropertyCount { bound: Bound::Min, .. } => "minProperties",
            Self::PropertyCount { bound: Bound::Max, .. } => "maxProperties",
            Self::Pattern(_) => "pattern",
            Self::UniqueItems(_) => "uniqueItems",
            Self::Required(_) => "required",
            Self::Dependency { .. } => "dependencies",
            Self::Enum(_) => "enum",
            Self::MultipleOf(_) => "multipleOf",
            Self::Disallow(_) => "disallow",
        }
    }

    /// Sub-schema evaluated against the same instance, if any
    pub fn schema(&self) -> Option<NodeId> {
        match self {
            Self::Dependency {
                requirement: DependencyRequirement::Schema(id),
                ..
            } => Some(*id),
            _ => None,
        }
    }

    pub fn satisfies(&self, instance: &Value, evaluator: &Evaluator<'_>) -> bool {
        match self.applies_to() {
            Some(kind) if JsonKind::of(instance) != kind => true,
            _ => self.check(instance, evaluator),
        }
    }

    fn check(&self, instance: &Value, evaluator: &Evaluator<'_>) -> bool {
        match self {
            Self::Bounds {
                bound,
                limit,
                exclusive,
            } => {
                let Some(n) = value::number(instance) else {
                    return true;
                };
                match (bound, exclusive) {
                    (Bound::Min, false) => n >= *limit,
                    (Bound::Min, true) => n > *limit,
                    (Bound::Max, false) => n <= *limit,
                    (Bound::Max, true) => n < *limit,
                }
            }
            Self::Length { bound, limit } => instance
                .as_str()
                .map_or(true, |s| bound.admits(s.chars().count(), *limit)),
            Self::ItemCount { bound, limit } => instance
                .as_array()
                .map_or(true, |items| bound.admits(items.len(), *limit)),
            Self::PropertyCount { bound, limit } => instance
                .as_object()
                .map_or(true, |object| bound.admits(object.len(), *limit)),
            Self::Pattern(pattern) => instance.as_str().map_or(true, |s| pattern.is_match(s)),
            Self::UniqueItems(enabled) => {
                !enabled || instance.as_array().map_or(true, |items| all_unique(items))
            }
            Self::Required(names) => instance
                .as_object()
                .map_or(true, |object| names.iter().all(|name| object.contains_key(name))),
            Self::Dependency {
                property,
                requirement,
            } => {
                let Some(object) = instance.as_object() else {
                    return true;
                };
                if !object.contains_key(property) {
                    return true;
                }
                match requirement {
                    DependencyRequirement::Properties(names) => {
                        names.iter().all(|name| object.contains_key(name))
                    }
                    DependencyRequirement::Schema(id) => evaluator.is_valid(*id, instance),
                }
            }
            Self::Enum(values) => values.iter().any(|v| value::equal(v, instance)),
            Self::MultipleOf(divisor) => {
                value::number(instance).map_or(true, |n| is_multiple_of(n, *divisor))
            }
            Self::Disallow(types) => !types.matches(instance),
        }
    }
}

fn all_unique(items: &[Value]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, left)| items[i + 1..].iter().all(|right| !value::equal(left, right)))
}

/// Numeric multiple test with floating-point tolerance
///
/// Whole operands use an exact remainder; otherwise the quotient must lie
/// within a few ULPs of an integer.
pub fn is_multiple_of(value: f64, divisor: f64) -> bool {
    if value::is_whole(value) && value::is_whole(divisor) {
        return value % divisor == 0.0;
    }
    let quotient = value / divisor;
    if !quotient.is_finite() {
        return false;
    }
    let tolerance = 4.0 * f64::EPSILON * quotient.abs().max(1.0);
    (quotient - quotient.round()).abs() <= tolerance
}
