//! Compiled schema representation and the compiler that builds it
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

pub mod compiler;
pub mod keywords;
pub mod node;

pub use compiler::{CompiledSchema, Compiler, DEFAULT_MAX_DEPTH};
pub use keywords::{Bound, DependencyRequirement, KeywordConstraint};
pub use node::{Additional, ArenaBuilder, ConstraintNode, Items, NodeId, SchemaArena, SchemaNode};
