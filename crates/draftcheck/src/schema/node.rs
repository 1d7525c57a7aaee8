//! Compiled constraint tree
//!
//! Every compiled schema lives in a [`SchemaArena`] and is addressed by
//! [`NodeId`]. A `$ref` compiles to [`SchemaNode::Reference`], an index into
//! the same arena, so shared and recursive schemas are plain graph edges.
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::loader::Scope;
use crate::schema::keywords::KeywordConstraint;
use crate::types::TypeSet;
use regex::Regex;

/// Index of a node in its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// One arena slot: an own set of constraints, or a resolved `$ref`
#[derive(Debug)]
pub enum SchemaNode {
    Direct(ConstraintNode),
    Reference(NodeId),
}

/// `items` in its two forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    /// One schema for every element
    Single(NodeId),
    /// schema[i] for element[i]
    Positional(Vec<NodeId>),
}

/// `additionalProperties` / `additionalItems` policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Additional {
    #[default]
    Allow,
    Forbid,
    Schema(NodeId),
}

/// A compiled schema object
#[derive(Debug, Default)]
pub struct ConstraintNode {
    pub types: TypeSet,
    pub keywords: Vec<KeywordConstraint>,
    pub properties: Vec<(String, NodeId)>,
    pub pattern_properties: Vec<(Regex, NodeId)>,
    pub items: Option<Items>,
    pub additional_properties: Additional,
    pub additional_items: Additional,
    pub all_of: Vec<NodeId>,
    pub any_of: Vec<NodeId>,
    pub one_of: Vec<NodeId>,
    pub not: Option<NodeId>,
    pub parent: Option<NodeId>,
    pub scope: Option<Scope>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ConstraintNode {
    /// Child named by `properties`
    pub fn property(&self, name: &str) -> Option<NodeId> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, id)| *id)
    }

    /// Whether a key is claimed by `properties` or `patternProperties`
    pub fn claims_key(&self, key: &str) -> bool {
        self.property(key).is_some()
            || self
                .pattern_properties
                .iter()
                .any(|(pattern, _)| pattern.is_match(key))
    }

    /// Edges that apply to the same instance this node sees
    pub(crate) fn in_place_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.all_of
            .iter()
            .chain(&self.any_of)
            .chain(&self.one_of)
            .copied()
            .chain(self.not)
            .chain(self.keywords.iter().filter_map(KeywordConstraint::schema))
    }
}

/// Arena under construction; slots may be reserved before they are filled
#[derive(Debug, Default)]
pub struct ArenaBuilder {
    slots: Vec<Option<SchemaNode>>,
}

impl ArenaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an id whose node will be filled later
    pub fn reserve(&mut self) -> NodeId {
        self.slots.push(None);
        NodeId::new(self.slots.len() - 1)
    }

    pub fn fill(&mut self, id: NodeId, node: SchemaNode) {
        self.slots[id.0] = Some(node);
    }

    /// Freeze into an immutable arena; `None` if a reserved slot was never filled
    pub fn finish(self) -> Option<SchemaArena> {
        let nodes = self.slots.into_iter().collect::<Option<Vec<_>>>()?;
        Some(SchemaArena { nodes })
    }
}

/// Immutable compiled schema graph
#[derive(Debug)]
pub struct SchemaArena {
    nodes: Vec<SchemaNode>,
}

impl SchemaArena {
    pub fn get(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Follow `Reference` links to the concrete node
    ///
    /// Reference-only cycles are rejected at compile time, so the walk ends.
    pub fn resolve(&self, mut id: NodeId) -> &ConstraintNode {
        loop {
            match &self.nodes[id.0] {
                SchemaNode::Direct(node) => return node,
                SchemaNode::Reference(target) => id = *target,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a cycle made only of `$ref`, combinator and dependency edges
    ///
    /// Such a cycle revisits the same instance forever. Returns one node on
    /// the cycle.
    pub fn find_in_place_cycle(&self) -> Option<NodeId> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Active,
            Done,
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if marks[start] != Mark::New {
                continue;
            }
            // Iterative DFS: (node, expanded-children, next child position)
            let mut stack: Vec<(usize, Vec<NodeId>, usize)> = Vec::new();
            marks[start] = Mark::Active;
            stack.push((start, self.in_place_edges(start), 0));

            while let Some(frame) = stack.last_mut() {
                let next = frame.1.get(frame.2).copied();
                match next {
                    Some(child) => {
                        frame.2 += 1;
                        match marks[child.0] {
                            Mark::Active => return Some(child),
                            Mark::New => {
                                marks[child.0] = Mark::Active;
                                let edges = self.in_place_edges(child.0);
                                stack.push((child.0, edges, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        let node = frame.0;
                        marks[node] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }
        None
    }

    fn in_place_edges(&self, index: usize) -> Vec<NodeId> {
        match &self.nodes[index] {
            SchemaNode::Reference(target) => vec![*target],
            SchemaNode::Direct(node) => node.in_place_children().collect(),
        }
    }
}
