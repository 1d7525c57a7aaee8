//! Constraint tree evaluation
//!
//! A node passes when, in order and short-circuiting: the type matches,
//! every keyword constraint holds, the object checks hold
//! (`patternProperties`, `properties`, `additionalProperties`), the array
//! checks hold (`items`, `additionalItems`) and the combinators hold.
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::schema::{Additional, ConstraintNode, Items, NodeId, SchemaArena};
use serde_json::{Map, Value};

/// Read-only walker over a compiled arena
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    arena: &'a SchemaArena,
}

impl<'a> Evaluator<'a> {
    pub fn new(arena: &'a SchemaArena) -> Self {
        Self { arena }
    }

    /// Check an instance against the node `id`
    pub fn is_valid(&self, id: NodeId, instance: &Value) -> bool {
        let node = self.arena.resolve(id);
        node.types.matches(instance)
            && node
                .keywords
                .iter()
                .all(|keyword| keyword.satisfies(instance, self))
            && self.object_valid(node, instance)
            && self.array_valid(node, instance)
            && self.combinators_valid(node, instance)
    }

    fn object_valid(&self, node: &ConstraintNode, instance: &Value) -> bool {
        let Value::Object(object) = instance else {
            return true;
        };

        let patterns_valid = node.pattern_properties.iter().all(|(pattern, id)| {
            object
                .iter()
                .filter(|(key, _)| pattern.is_match(key))
                .all(|(_, value)| self.is_valid(*id, value))
        });
        if !patterns_valid {
            return false;
        }

        let properties_valid = node
            .properties
            .iter()
            .all(|(name, id)| object.get(name).map_or(true, |value| self.is_valid(*id, value)));

        properties_valid && self.additional_properties_valid(node, object)
    }

    fn additional_properties_valid(&self, node: &ConstraintNode, object: &Map<String, Value>) -> bool {
        let mut unclaimed = object.iter().filter(|(key, _)| !node.claims_key(key));
        match node.additional_properties {
            Additional::Allow => true,
            Additional::Forbid => unclaimed.next().is_none(),
            Additional::Schema(id) => unclaimed.all(|(_, value)| self.is_valid(id, value)),
        }
    }

    fn array_valid(&self, node: &ConstraintNode, instance: &Value) -> bool {
        let Value::Array(elements) = instance else {
            return true;
        };

        match &node.items {
            None => true,
            Some(Items::Single(id)) => elements.iter().all(|element| self.is_valid(*id, element)),
            Some(Items::Positional(schemas)) => {
                let positional = schemas
                    .iter()
                    .zip(elements)
                    .all(|(id, element)| self.is_valid(*id, element));
                // Elements past the positional schemas
                let mut rest = elements.iter().skip(schemas.len());
                positional
                    && match node.additional_items {
                        Additional::Allow => true,
                        Additional::Forbid => rest.next().is_none(),
                        Additional::Schema(id) => rest.all(|element| self.is_valid(id, element)),
                    }
            }
        }
    }

    fn combinators_valid(&self, node: &ConstraintNode, instance: &Value) -> bool {
        node.all_of.iter().all(|id| self.is_valid(*id, instance))
            && (node.any_of.is_empty() || node.any_of.iter().any(|id| self.is_valid(*id, instance)))
            && (node.one_of.is_empty()
                || node
                    .one_of
                    .iter()
                    .filter(|id| self.is_valid(**id, instance))
                    .count()
                    == 1)
            && node.not.map_or(true, |id| !self.is_valid(id, instance))
    }
}
