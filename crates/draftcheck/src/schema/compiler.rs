//! Schema compiler
//!
//! Turns a raw schema document into a [`SchemaArena`]. A schema object is
//! compiled by running a fixed table of keyword handlers over it; each
//! handler parses one keyword into tagged [`Fragment`]s which are merged
//! into a single [`ConstraintNode`]. `$ref` short-circuits the table and
//! compiles to a [`SchemaNode::Reference`].
//!
//! Copyright (c) 2025 Draftcheck Team
//! Licensed under the Apache-2.0 license

use crate::draft::Draft;
use crate::error::{CompileError, CompileResult};
use crate::loader::resolver::apply_json_pointer;
use crate::loader::{CacheStats, ReferenceResolver, Scope};
use crate::schema::keywords::{Bound, DependencyRequirement, KeywordConstraint};
use crate::schema::node::{
    Additional, ArenaBuilder, ConstraintNode, Items, NodeId, SchemaArena, SchemaNode,
};
use crate::types::TypeSet;
use crate::value::{self, JsonKind};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Default limit on schema nesting
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// One keyword occurrence handed to its handler
struct Keyword<'a> {
    name: &'static str,
    value: &'a Value,
    /// The whole schema object the keyword sits in
    siblings: &'a Map<String, Value>,
    node: NodeId,
    scope: &'a Scope,
    depth: usize,
}

/// Parsed piece of a constraint node
enum Fragment {
    Types(TypeSet),
    Keyword(KeywordConstraint),
    Property(String, NodeId),
    PatternProperty(Regex, NodeId),
    Items(Items),
    AdditionalProperties(Additional),
    AdditionalItems(Additional),
    AllOf(Vec<NodeId>),
    AnyOf(Vec<NodeId>),
    OneOf(Vec<NodeId>),
    Not(NodeId),
    Title(String),
    Description(String),
}

type Handler = fn(&mut Compiler, &Keyword<'_>) -> CompileResult<Vec<Fragment>>;

/// Keyword handlers, in evaluation order of the keyword constraints they produce
static KEYWORD_HANDLERS: &[(&str, Handler)] = &[
    ("$schema", schema_uri),
    ("type", types),
    ("disallow", disallow),
    ("enum", enumeration),
    ("minimum", bound),
    ("maximum", bound),
    ("exclusiveMinimum", exclusive_flag),
    ("exclusiveMaximum", exclusive_flag),
    ("multipleOf", multiple_of),
    ("divisibleBy", multiple_of),
    ("minLength", count),
    ("maxLength", count),
    ("pattern", pattern),
    ("minItems", count),
    ("maxItems", count),
    ("uniqueItems", unique_items),
    ("minProperties", count),
    ("maxProperties", count),
    ("required", required),
    ("dependencies", dependencies),
    ("properties", properties),
    ("patternProperties", pattern_properties),
    ("additionalProperties", additional_properties),
    ("items", items),
    ("additionalItems", additional_items),
    ("allOf", combinator),
    ("extends", extends),
    ("anyOf", combinator),
    ("oneOf", combinator),
    ("not", not),
    ("title", annotation),
    ("description", annotation),
];

/// Result of a successful compilation pass
#[derive(Debug)]
pub struct CompiledSchema {
    pub arena: SchemaArena,
    pub root: NodeId,
    pub draft: Draft,
    pub stats: CacheStats,
}

/// Single-use compiler for one root document
#[derive(Debug)]
pub struct Compiler {
    arena: ArenaBuilder,
    resolver: ReferenceResolver,
    draft: Draft,
    max_depth: usize,
    /// `$ref` text behind each reference node, for cycle reports
    references: HashMap<NodeId, (String, Scope)>,
}

impl Compiler {
    pub fn new(resolver: ReferenceResolver, draft: Draft) -> Self {
        Self {
            arena: ArenaBuilder::new(),
            resolver,
            draft,
            max_depth: DEFAULT_MAX_DEPTH,
            references: HashMap::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Compile the resolver's root document
    pub fn compile(mut self) -> CompileResult<CompiledSchema> {
        let document = self.resolver.root();
        let root = self.arena.reserve();
        self.resolver.register(Scope::Local.key(""), root);
        self.compile_into(root, &document, None, &Scope::Local, 0)?;

        let stats = self.resolver.stats();
        let arena = self.arena.finish().ok_or_else(|| {
            CompileError::reference("#", Scope::Local, "reference target was never compiled")
        })?;

        if let Some(node) = arena.find_in_place_cycle() {
            let (reference, scope) = self
                .references
                .remove(&node)
                .unwrap_or_else(|| ("#".to_string(), Scope::Local));
            return Err(CompileError::reference(
                reference,
                scope,
                "circular reference without an instance-consuming step",
            ));
        }

        tracing::debug!(
            nodes = arena.len(),
            draft = %self.draft,
            fetches = stats.fetches,
            "compiled schema"
        );

        Ok(CompiledSchema {
            arena,
            root,
            draft: self.draft,
            stats,
        })
    }

    /// Compile `raw` into the already reserved slot `id`
    fn compile_into(
        &mut self,
        id: NodeId,
        raw: &Value,
        parent: Option<NodeId>,
        scope: &Scope,
        depth: usize,
    ) -> CompileResult<()> {
        if depth > self.max_depth {
            return Err(CompileError::invalid(
                "schema",
                format!("nesting exceeds the maximum depth of {}", self.max_depth),
            ));
        }

        let object = raw.as_object().ok_or_else(|| {
            CompileError::invalid(
                "schema",
                format!("expected a JSON object, found {}", JsonKind::of(raw)),
            )
        })?;

        if let Some(reference) = object.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| CompileError::invalid("$ref", "must be a string"))?;
            let target = self.resolve_reference(reference, parent, scope, depth)?;
            self.arena.fill(id, SchemaNode::Reference(target));
            self.references
                .insert(id, (reference.to_string(), scope.clone()));
            return Ok(());
        }

        let mut fragments = Vec::new();
        for &(name, handler) in KEYWORD_HANDLERS {
            if let Some(value) = object.get(name) {
                let keyword = Keyword {
                    name,
                    value,
                    siblings: object,
                    node: id,
                    scope,
                    depth,
                };
                fragments.extend(handler(self, &keyword)?);
            }
        }

        let node = merge(fragments, parent, scope);
        self.arena.fill(id, SchemaNode::Direct(node));
        Ok(())
    }

    /// Node for a `$ref`, compiling its target on first use
    fn resolve_reference(
        &mut self,
        reference: &str,
        parent: Option<NodeId>,
        scope: &Scope,
        depth: usize,
    ) -> CompileResult<NodeId> {
        let target = self.resolver.parse(reference, scope)?;
        if let Some(id) = self.resolver.cached(&target.key) {
            return Ok(id);
        }

        let document = self.resolver.document(&target.document, reference, scope)?;
        let raw = apply_json_pointer(&document, &target.pointer, reference, scope)?;
        if !raw.is_object() {
            return Err(CompileError::reference(
                reference,
                scope,
                format!("target is {}, not a schema object", JsonKind::of(raw)),
            ));
        }

        let id = self.arena.reserve();
        self.resolver.register(target.key.clone(), id);

        // A remote document root has no parent in the referring tree
        let parent = if target.pointer.is_empty() && !target.document.is_local() {
            None
        } else {
            parent
        };
        self.compile_into(id, raw, parent, &target.document, depth + 1)?;
        Ok(id)
    }

    fn compile_child(&mut self, raw: &Value, keyword: &Keyword<'_>) -> CompileResult<NodeId> {
        let id = self.arena.reserve();
        self.compile_into(id, raw, Some(keyword.node), keyword.scope, keyword.depth + 1)?;
        Ok(id)
    }

    fn compile_list(&mut self, keyword: &Keyword<'_>) -> CompileResult<Vec<NodeId>> {
        let schemas = keyword
            .value
            .as_array()
            .filter(|schemas| !schemas.is_empty())
            .ok_or_else(|| CompileError::invalid(keyword.name, "must be a non-empty array of schemas"))?;
        schemas
            .iter()
            .map(|raw| self.compile_child(raw, keyword))
            .collect()
    }
}

fn merge(fragments: Vec<Fragment>, parent: Option<NodeId>, scope: &Scope) -> ConstraintNode {
    let mut node = ConstraintNode {
        parent,
        scope: Some(scope.clone()),
        ..ConstraintNode::default()
    };
    for fragment in fragments {
        match fragment {
            Fragment::Types(types) => node.types = types,
            Fragment::Keyword(keyword) => node.keywords.push(keyword),
            Fragment::Property(name, id) => node.properties.push((name, id)),
            Fragment::PatternProperty(pattern, id) => node.pattern_properties.push((pattern, id)),
            Fragment::Items(items) => node.items = Some(items),
            Fragment::AdditionalProperties(policy) => node.additional_properties = policy,
            Fragment::AdditionalItems(policy) => node.additional_items = policy,
            Fragment::AllOf(ids) => node.all_of.extend(ids),
            Fragment::AnyOf(ids) => node.any_of.extend(ids),
            Fragment::OneOf(ids) => node.one_of.extend(ids),
            Fragment::Not(id) => node.not = Some(id),
            Fragment::Title(title) => node.title = Some(title),
            Fragment::Description(description) => node.description = Some(description),
        }
    }
    node
}

fn schema_uri(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    if !keyword.value.is_string() {
        return Err(CompileError::invalid(keyword.name, "must be a URI string"));
    }
    Ok(Vec::new())
}

fn types(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let types = TypeSet::from_value(keyword.name, keyword.value)?;
    Ok(vec![Fragment::Types(types)])
}

fn disallow(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    if compiler.draft != Draft::Draft3 {
        return Ok(Vec::new());
    }
    let types = TypeSet::from_value(keyword.name, keyword.value)?;
    Ok(vec![Fragment::Keyword(KeywordConstraint::Disallow(types))])
}

fn enumeration(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let values = keyword
        .value
        .as_array()
        .filter(|values| !values.is_empty())
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be a non-empty array"))?;
    Ok(vec![Fragment::Keyword(KeywordConstraint::Enum(values.clone()))])
}

fn bound(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let limit = value::number(keyword.value)
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be a number"))?;
    let (bound, flag) = match keyword.name {
        "minimum" => (Bound::Min, "exclusiveMinimum"),
        _ => (Bound::Max, "exclusiveMaximum"),
    };
    let exclusive = keyword
        .siblings
        .get(flag)
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Ok(vec![Fragment::Keyword(KeywordConstraint::Bounds {
        bound,
        limit,
        exclusive,
    })])
}

fn exclusive_flag(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    if !keyword.value.is_boolean() {
        return Err(CompileError::invalid(keyword.name, "must be a boolean"));
    }
    let bound = match keyword.name {
        "exclusiveMinimum" => "minimum",
        _ => "maximum",
    };
    if !keyword.siblings.contains_key(bound) {
        return Err(CompileError::invalid(
            keyword.name,
            format!("present without '{}'", bound),
        ));
    }
    Ok(Vec::new())
}

fn multiple_of(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let native = match compiler.draft {
        Draft::Draft3 => "divisibleBy",
        Draft::Draft4 => "multipleOf",
    };
    if keyword.name != native {
        return Ok(Vec::new());
    }
    let divisor = value::number(keyword.value)
        .filter(|divisor| *divisor > 0.0)
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be a number greater than 0"))?;
    Ok(vec![Fragment::Keyword(KeywordConstraint::MultipleOf(divisor))])
}

fn count(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let limit = value::as_count(keyword.value)
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be a non-negative integer"))?;
    let constraint = match keyword.name {
        "minLength" => KeywordConstraint::Length { bound: Bound::Min, limit },
        "maxLength" => KeywordConstraint::Length { bound: Bound::Max, limit },
        "minItems" => KeywordConstraint::ItemCount { bound: Bound::Min, limit },
        "maxItems" => KeywordConstraint::ItemCount { bound: Bound::Max, limit },
        "minProperties" => KeywordConstraint::PropertyCount { bound: Bound::Min, limit },
        _ => KeywordConstraint::PropertyCount { bound: Bound::Max, limit },
    };
    Ok(vec![Fragment::Keyword(constraint)])
}

fn pattern(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let source = keyword
        .value
        .as_str()
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be a string"))?;
    let regex = compile_regex(keyword.name, source)?;
    Ok(vec![Fragment::Keyword(KeywordConstraint::Pattern(regex))])
}

fn compile_regex(keyword: &str, source: &str) -> CompileResult<Regex> {
    Regex::new(source).map_err(|e| {
        CompileError::invalid(keyword, format!("invalid regular expression '{}': {}", source, e))
    })
}

fn unique_items(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    match keyword.value {
        Value::Bool(true) => Ok(vec![Fragment::Keyword(KeywordConstraint::UniqueItems(true))]),
        Value::Bool(false) => Ok(Vec::new()),
        _ => Err(CompileError::invalid(keyword.name, "must be a boolean")),
    }
}

fn required(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    match keyword.value {
        // draft-3 property flag; the enclosing `properties` handler reads it
        Value::Bool(_) if compiler.draft == Draft::Draft3 => Ok(Vec::new()),
        Value::Array(entries) => {
            let names = property_names(keyword.name, entries)?;
            if let Some(duplicate) = first_duplicate(&names) {
                return Err(CompileError::invalid(
                    keyword.name,
                    format!("duplicate property name '{}'", duplicate),
                ));
            }
            Ok(vec![Fragment::Keyword(KeywordConstraint::Required(names))])
        }
        _ => Err(CompileError::invalid(
            keyword.name,
            "must be an array of property names",
        )),
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .find(|name| !seen.insert(*name))
}

fn property_names(keyword: &str, entries: &[Value]) -> CompileResult<Vec<String>> {
    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| CompileError::invalid(keyword, "entries must be strings"))
        })
        .collect()
}

fn dependencies(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let object = keyword
        .value
        .as_object()
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be an object"))?;

    let mut fragments = Vec::with_capacity(object.len());
    for (property, dependency) in object {
        let requirement = match dependency {
            Value::Array(entries) => {
                DependencyRequirement::Properties(property_names(keyword.name, entries)?)
            }
            Value::Object(_) => {
                DependencyRequirement::Schema(compiler.compile_child(dependency, keyword)?)
            }
            Value::String(name) if compiler.draft == Draft::Draft3 => {
                DependencyRequirement::Properties(vec![name.clone()])
            }
            _ => {
                return Err(CompileError::invalid(
                    keyword.name,
                    format!("dependency of '{}' must be an array of names or a schema", property),
                ))
            }
        };
        fragments.push(Fragment::Keyword(KeywordConstraint::Dependency {
            property: property.clone(),
            requirement,
        }));
    }
    Ok(fragments)
}

fn properties(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let object = keyword
        .value
        .as_object()
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be an object of schemas"))?;

    let mut fragments = Vec::with_capacity(object.len() + 1);
    let mut flagged = Vec::new();
    for (name, raw) in object {
        let id = compiler.compile_child(raw, keyword)?;
        fragments.push(Fragment::Property(name.clone(), id));
        if compiler.draft == Draft::Draft3 && raw.get("required") == Some(&Value::Bool(true)) {
            flagged.push(name.clone());
        }
    }
    if !flagged.is_empty() {
        fragments.push(Fragment::Keyword(KeywordConstraint::Required(flagged)));
    }
    Ok(fragments)
}

fn pattern_properties(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let object = keyword
        .value
        .as_object()
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be an object of schemas"))?;

    let mut fragments = Vec::with_capacity(object.len());
    for (source, raw) in object {
        let regex = compile_regex(keyword.name, source)?;
        let id = compiler.compile_child(raw, keyword)?;
        fragments.push(Fragment::PatternProperty(regex, id));
    }
    Ok(fragments)
}

fn additional(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Additional> {
    match keyword.value {
        Value::Bool(true) => Ok(Additional::Allow),
        Value::Bool(false) => Ok(Additional::Forbid),
        Value::Object(_) => Ok(Additional::Schema(compiler.compile_child(keyword.value, keyword)?)),
        _ => Err(CompileError::invalid(keyword.name, "must be a boolean or a schema")),
    }
}

fn additional_properties(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    Ok(vec![Fragment::AdditionalProperties(additional(compiler, keyword)?)])
}

fn additional_items(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    Ok(vec![Fragment::AdditionalItems(additional(compiler, keyword)?)])
}

fn items(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let items = match keyword.value {
        Value::Object(_) => Items::Single(compiler.compile_child(keyword.value, keyword)?),
        Value::Array(schemas) => Items::Positional(
            schemas
                .iter()
                .map(|raw| compiler.compile_child(raw, keyword))
                .collect::<CompileResult<_>>()?,
        ),
        _ => {
            return Err(CompileError::invalid(
                keyword.name,
                "must be a schema or an array of schemas",
            ))
        }
    };
    Ok(vec![Fragment::Items(items)])
}

fn combinator(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let schemas = compiler.compile_list(keyword)?;
    let fragment = match keyword.name {
        "allOf" => Fragment::AllOf(schemas),
        "anyOf" => Fragment::AnyOf(schemas),
        _ => Fragment::OneOf(schemas),
    };
    Ok(vec![fragment])
}

fn extends(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    if compiler.draft != Draft::Draft3 {
        return Ok(Vec::new());
    }
    let schemas = match keyword.value {
        Value::Object(_) => vec![compiler.compile_child(keyword.value, keyword)?],
        _ => compiler.compile_list(keyword)?,
    };
    Ok(vec![Fragment::AllOf(schemas)])
}

fn not(compiler: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    Ok(vec![Fragment::Not(compiler.compile_child(keyword.value, keyword)?)])
}

fn annotation(_: &mut Compiler, keyword: &Keyword<'_>) -> CompileResult<Vec<Fragment>> {
    let text = keyword
        .value
        .as_str()
        .ok_or_else(|| CompileError::invalid(keyword.name, "must be a string"))?
        .to_string();
    Ok(vec![match keyword.name {
        "title" => Fragment::Title(text),
        _ => Fragment::Description(text),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{NoFetcher, StaticFetcher};
    use serde_json::json;
    use std::sync::Arc;

    fn compile_as(schema: Value, draft: Draft) -> CompileResult<CompiledSchema> {
        let resolver = ReferenceResolver::new(schema, Arc::new(NoFetcher), None);
        Compiler::new(resolver, draft).compile()
    }

    fn compile(schema: Value) -> CompileResult<CompiledSchema> {
        compile_as(schema, Draft::Draft4)
    }

    fn reason(err: CompileError) -> String {
        err.to_string()
    }

    #[test]
    fn test_root_must_be_object() {
        let err = compile(json!([1, 2])).unwrap_err();
        assert_eq!(err.keyword(), Some("schema"));
    }

    #[test]
    fn test_keywords_merge_into_one_node() {
        let compiled = compile(json!({
            "title": "Product",
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": {"type": "integer"},
                "price": {"type": "number", "minimum": 0, "exclusiveMinimum": true}
            }
        }))
        .unwrap();

        let root = compiled.arena.resolve(compiled.root);
        assert_eq!(root.title.as_deref(), Some("Product"));
        assert_eq!(root.properties.len(), 2);
        assert_eq!(root.keywords.len(), 1);
        assert_eq!(root.parent, None);

        let price = compiled.arena.resolve(root.property("price").unwrap());
        assert_eq!(price.parent, Some(compiled.root));
        assert!(matches!(
            price.keywords[0],
            KeywordConstraint::Bounds { bound: Bound::Min, exclusive: true, .. }
        ));
    }

    #[test]
    fn test_exclusive_flag_requires_bound() {
        let err = compile(json!({"exclusiveMaximum": true})).unwrap_err();
        assert_eq!(err.keyword(), Some("exclusiveMaximum"));

        let err = compile(json!({"minimum": 1, "exclusiveMinimum": "yes"})).unwrap_err();
        assert_eq!(err.keyword(), Some("exclusiveMinimum"));
    }

    #[test]
    fn test_malformed_keywords() {
        for (schema, keyword) in [
            (json!({"enum": []}), "enum"),
            (json!({"required": ["a", "a"]}), "required"),
            (json!({"required": true}), "required"),
            (json!({"multipleOf": 0}), "multipleOf"),
            (json!({"minLength": -1}), "minLength"),
            (json!({"maxItems": 1.5}), "maxItems"),
            (json!({"pattern": "("}), "pattern"),
            (json!({"patternProperties": {"[": {}}}), "patternProperties"),
            (json!({"uniqueItems": 1}), "uniqueItems"),
            (json!({"items": 3}), "items"),
            (json!({"additionalProperties": "no"}), "additionalProperties"),
            (json!({"allOf": []}), "allOf"),
            (json!({"dependencies": {"a": 1}}), "dependencies"),
            (json!({"$ref": 7}), "$ref"),
            (json!({"type": 5}), "type"),
            (json!({"title": 5}), "title"),
        ] {
            let err = compile(schema.clone()).unwrap_err();
            assert_eq!(err.keyword(), Some(keyword), "schema {}", schema);
        }
    }

    #[test]
    fn test_unknown_type_name() {
        let err = compile(json!({"type": ["string", "text"]})).unwrap_err();
        assert!(matches!(err, CompileError::UnknownType { ref name } if name == "text"));
    }

    #[test]
    fn test_unknown_keywords_ignored() {
        let compiled = compile(json!({"format": "email", "x-extra": {"deep": 1}})).unwrap();
        assert_eq!(compiled.arena.len(), 1);
    }

    #[test]
    fn test_ref_siblings_ignored() {
        let compiled = compile(json!({
            "definitions": {"s": {"type": "string"}},
            "properties": {
                "name": {"$ref": "#/definitions/s", "minLength": 100, "type": 5}
            }
        }))
        .unwrap();
        let root = compiled.arena.resolve(compiled.root);
        let name = root.property("name").unwrap();
        assert!(matches!(compiled.arena.get(name), SchemaNode::Reference(_)));
        assert!(compiled.arena.resolve(name).keywords.is_empty());
    }

    #[test]
    fn test_shared_reference_compiled_once() {
        let compiled = compile(json!({
            "definitions": {"s": {"type": "string"}},
            "properties": {
                "a": {"$ref": "#/definitions/s"},
                "b": {"$ref": "#/definitions/s"}
            }
        }))
        .unwrap();
        let root = compiled.arena.resolve(compiled.root);
        let target = |name: &str| match compiled.arena.get(root.property(name).unwrap()) {
            SchemaNode::Reference(id) => *id,
            SchemaNode::Direct(_) => panic!("expected reference"),
        };
        assert_eq!(target("a"), target("b"));
        assert_eq!(compiled.stats.hits, 1);
    }

    #[test]
    fn test_percent_encoded_reference_shares_node() {
        let compiled = compile(json!({
            "definitions": {"a b": {"type": "string"}},
            "properties": {
                "encoded": {"$ref": "#/definitions/a%20b"},
                "plain": {"$ref": "#/definitions/a b"}
            }
        }))
        .unwrap();
        let root = compiled.arena.resolve(compiled.root);
        let target = |name: &str| match compiled.arena.get(root.property(name).unwrap()) {
            SchemaNode::Reference(id) => *id,
            SchemaNode::Direct(_) => panic!("expected reference"),
        };
        assert_eq!(target("encoded"), target("plain"));
        assert_eq!(compiled.stats.hits, 1);
        assert_eq!(compiled.stats.misses, 1);
        assert_eq!(compiled.stats.hit_rate(), 50.0);
        assert_eq!(compiled.arena.len(), 4);
    }

    #[test]
    fn test_pure_reference_cycle_rejected() {
        let err = compile(json!({"$ref": "#"})).unwrap_err();
        assert!(err.is_reference_error());

        let err = compile(json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"allOf": [{"$ref": "#/definitions/a"}]}
            },
            "$ref": "#/definitions/a"
        }))
        .unwrap_err();
        assert!(err.is_reference_error());
    }

    #[test]
    fn test_recursive_schema_compiles() {
        let compiled = compile(json!({
            "type": "object",
            "properties": {
                "children": {"type": "array", "items": {"$ref": "#"}}
            }
        }))
        .unwrap();
        assert!(compiled.arena.find_in_place_cycle().is_none());
    }

    #[test]
    fn test_non_object_reference_target() {
        let err = compile(json!({
            "definitions": {"n": 5},
            "$ref": "#/definitions/n"
        }))
        .unwrap_err();
        assert!(err.is_reference_error());
        assert!(reason(err).contains("not a schema object"));
    }

    #[test]
    fn test_depth_limit() {
        let mut schema = json!({"type": "string"});
        for _ in 0..10 {
            schema = json!({"items": schema});
        }
        let resolver = ReferenceResolver::new(schema.clone(), Arc::new(NoFetcher), None);
        let err = Compiler::new(resolver, Draft::Draft4)
            .with_max_depth(5)
            .compile()
            .unwrap_err();
        assert!(reason(err).contains("maximum depth"));

        assert!(compile(schema).is_ok());
    }

    #[test]
    fn test_remote_reference_scope() {
        let fetcher = StaticFetcher::new().with_json(
            "http://example.com/defs.json",
            &json!({"definitions": {"id": {"type": "integer"}}}),
        );
        let resolver = ReferenceResolver::new(
            json!({"$ref": "http://example.com/defs.json#/definitions/id"}),
            Arc::new(fetcher),
            None,
        );
        let compiled = Compiler::new(resolver, Draft::Draft4).compile().unwrap();
        let node = compiled.arena.resolve(compiled.root);
        assert!(matches!(node.scope, Some(Scope::Remote(ref uri)) if uri.as_str() == "http://example.com/defs.json"));
        assert_eq!(compiled.stats.fetches, 1);
    }

    #[test]
    fn test_draft3_keywords() {
        let compiled = compile_as(
            json!({
                "extends": {"type": "object"},
                "disallow": "null",
                "divisibleBy": 2,
                "properties": {"id": {"required": true}},
                "dependencies": {"a": "b"}
            }),
            Draft::Draft3,
        )
        .unwrap();
        let root = compiled.arena.resolve(compiled.root);
        assert_eq!(root.all_of.len(), 1);
        let names: Vec<_> = root.keywords.iter().map(KeywordConstraint::keyword).collect();
        assert_eq!(
            names,
            vec!["disallow", "multipleOf", "dependencies", "required"]
        );
    }

    #[test]
    fn test_draft3_keywords_inert_under_draft4() {
        let compiled = compile(json!({
            "extends": {"type": "object"},
            "disallow": "null",
            "divisibleBy": 2
        }))
        .unwrap();
        let root = compiled.arena.resolve(compiled.root);
        assert!(root.all_of.is_empty());
        assert!(root.keywords.is_empty());

        let err = compile(json!({"dependencies": {"a": "b"}})).unwrap_err();
        assert_eq!(err.keyword(), Some("dependencies"));
    }
}
