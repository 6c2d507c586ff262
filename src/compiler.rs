//! Turning schema JSON into a tree of nodes.
//!
//! Loading happens in two passes. The first builds nodes bottom-up and compiles every keyword.
//! The second walks the finished tree with the inherited base URI, registers resources, fixes
//! anchors to their owning resource and resolves the URI of every reference. References are
//! never followed during loading, so cycles in the schema graph need no special handling here.
use std::{mem, sync::Arc};

use serde_json::{Map, Value};

use crate::{
    draft::{Draft, Identifier},
    error::SchemaError,
    keywords::{
        self,
        if_::Conditional,
        ref_::{Reference, ReferenceKind},
        BoxedValidator, KeywordKind, Siblings,
    },
    node::{Body, NodeId, Resource, SchemaArena, SchemaNode},
    options::ValidationOptions,
    paths::Location,
    pattern_cache::Matcher,
    registry::Registry,
    uri,
};

/// Container for information required to build a tree.
///
/// Tracks the dialect in effect and the location of the schema being compiled within its
/// document.
pub(crate) struct Context<'a> {
    arena: &'a mut SchemaArena,
    config: &'a ValidationOptions,
    draft: Draft,
    location: Location,
}

impl<'a> Context<'a> {
    pub(crate) fn new(arena: &'a mut SchemaArena, config: &'a ValidationOptions, draft: Draft) -> Self {
        Context {
            arena,
            config,
            draft,
            location: Location::new(),
        }
    }

    pub(crate) fn draft(&self) -> Draft {
        self.draft
    }

    pub(crate) fn config(&self) -> &ValidationOptions {
        self.config
    }

    /// Location of the schema object currently being compiled.
    pub(crate) fn location(&self) -> &Location {
        &self.location
    }

    /// A fault for a keyword of the current schema object.
    pub(crate) fn invalid(&self, keyword: &'static str, message: impl Into<String>) -> SchemaError {
        SchemaError::invalid_keyword(keyword, &self.location.join(keyword), message)
    }

    /// Compile `schema` as if it were found at `location`.
    pub(crate) fn compile_at(
        &mut self,
        location: Location,
        schema: &Value,
    ) -> Result<NodeId, SchemaError> {
        let previous = mem::replace(&mut self.location, location);
        let result = compile_node(self, schema);
        self.location = previous;
        result
    }

    /// Compile the single subschema under `keyword`.
    pub(crate) fn compile_subschema(
        &mut self,
        keyword: &str,
        schema: &Value,
    ) -> Result<NodeId, SchemaError> {
        let location = self.location.join(keyword);
        self.compile_at(location, schema)
    }

    /// Compile an array of subschemas under `keyword`.
    pub(crate) fn compile_list(
        &mut self,
        keyword: &'static str,
        value: &Value,
    ) -> Result<Vec<NodeId>, SchemaError> {
        let Value::Array(items) = value else {
            return Err(self.invalid(keyword, "expected an array of schemas"));
        };
        let base = self.location.join(keyword);
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| self.compile_at(base.join(idx), item))
            .collect()
    }

    /// Compile an array of subschemas that must hold at least one element.
    pub(crate) fn compile_non_empty_list(
        &mut self,
        keyword: &'static str,
        value: &Value,
    ) -> Result<Vec<NodeId>, SchemaError> {
        let nodes = self.compile_list(keyword, value)?;
        if nodes.is_empty() {
            return Err(self.invalid(keyword, "expected a non-empty array"));
        }
        Ok(nodes)
    }

    /// Compile an object whose values are subschemas.
    pub(crate) fn compile_map(
        &mut self,
        keyword: &'static str,
        value: &Value,
    ) -> Result<Vec<(String, NodeId)>, SchemaError> {
        let Value::Object(entries) = value else {
            return Err(self.invalid(keyword, "expected an object of schemas"));
        };
        let base = self.location.join(keyword);
        entries
            .iter()
            .map(|(name, schema)| {
                self.compile_at(base.join(name), schema)
                    .map(|id| (name.clone(), id))
            })
            .collect()
    }

    /// Check that `pattern` is usable and warm the shared cache with it.
    pub(crate) fn matcher(&self, pattern: &str) -> Result<Arc<Matcher>, SchemaError> {
        self.config
            .pattern_cache()
            .get(pattern, self.config.pattern_timeout())
    }
}

/// Compile one document into `arena` and register its resources in `registry`.
///
/// A root without an absolute `$id` is registered under `base_uri`.
pub(crate) fn compile_document(
    arena: &mut SchemaArena,
    registry: &mut Registry,
    config: &ValidationOptions,
    schema: &Value,
    base_uri: &str,
) -> Result<NodeId, SchemaError> {
    let draft = match schema {
        Value::Object(object) => config.draft().detect(object)?,
        _ => config.draft(),
    };
    let root = {
        let mut ctx = Context::new(arena, config, draft);
        compile_node(&mut ctx, schema)?
    };
    let base_uri: Arc<str> = Arc::from(uri::without_fragment(base_uri));
    if let Some(body) = arena.body_mut(root) {
        body.resource
            .get_or_insert_with(|| Box::new(Resource::new(None)));
    }
    if arena.body(root).is_some() {
        assign_uris(arena, registry, root, &base_uri, root)?;
    } else {
        registry.insert(base_uri.to_string(), root)?;
    }
    tracing::debug!(
        base_uri = arena.base_uri(root).map_or(&*base_uri, |uri| &**uri),
        nodes = arena.len(),
        resources = registry.len(),
        ?draft,
        "Compiled schema document"
    );
    Ok(root)
}

fn compile_node(ctx: &mut Context<'_>, schema: &Value) -> Result<NodeId, SchemaError> {
    match schema {
        Value::Bool(value) => Ok(ctx.arena.push(SchemaNode::Boolean(*value))),
        Value::Object(object) => {
            let draft = ctx.draft.detect(object)?;
            let previous = mem::replace(&mut ctx.draft, draft);
            let body = compile_body(ctx, object);
            ctx.draft = previous;
            Ok(ctx.arena.push(SchemaNode::Body(Box::new(body?))))
        }
        _ => Err(SchemaError::InvalidSchema {
            location: ctx.location.clone(),
            value: schema.clone(),
        }),
    }
}

fn compile_body(ctx: &mut Context<'_>, object: &Map<String, Value>) -> Result<Body, SchemaError> {
    let draft = ctx.draft;
    let mut body = Body::new(draft);
    match draft.identifier_of(object) {
        Some(Identifier::Resource(id)) => {
            body.resource = Some(Box::new(Resource::new(Some(id.to_string()))));
        }
        Some(Identifier::Anchor(name)) => body.anchor = Some(name.to_string()),
        None => {}
    }
    if draft >= Draft::Draft201909 {
        if let Some(value) = object.get("$anchor") {
            body.anchor = Some(expect_str(ctx, "$anchor", value)?.to_string());
        }
    }
    match draft {
        Draft::Draft202012 => {
            if let Some(value) = object.get("$dynamicAnchor") {
                body.dynamic_anchor = Some(expect_str(ctx, "$dynamicAnchor", value)?.to_string());
            }
            if let Some(value) = object.get("$dynamicRef") {
                let raw = expect_str(ctx, "$dynamicRef", value)?;
                body.dynamic_reference = Some(Reference::new(ReferenceKind::Dynamic, raw));
            }
        }
        Draft::Draft201909 => {
            if let Some(value) = object.get("$recursiveAnchor") {
                body.recursive_anchor = value.as_bool().ok_or_else(|| {
                    ctx.invalid("$recursiveAnchor", "expected a boolean")
                })?;
            }
            if let Some(value) = object.get("$recursiveRef") {
                let raw = expect_str(ctx, "$recursiveRef", value)?;
                body.dynamic_reference = Some(Reference::new(ReferenceKind::Recursive, raw));
            }
        }
        Draft::Draft7 => {}
    }
    if let Some(value) = object.get("$ref") {
        let raw = expect_str(ctx, "$ref", value)?;
        body.reference = Some(Reference::new(ReferenceKind::Static, raw));
    }
    if draft >= Draft::Draft201909 {
        if let Some(value) = object.get("$defs") {
            body.defs = ctx.compile_map("$defs", value)?;
        }
    }
    if let Some(value) = object.get("definitions") {
        body.legacy_definitions = ctx.compile_map("definitions", value)?;
    }
    // Draft 7 ignores every sibling of `$ref`
    let evaluates_siblings = body.reference.is_none() || !draft.ref_overrides_siblings();
    if evaluates_siblings {
        body.conditional = Conditional::compile(ctx, object)?;
    }
    for (keyword, value) in object {
        if let Some(kind) = KeywordKind::from_name(keyword) {
            if let Some(compile) = keywords::get_for_draft(draft, kind) {
                if evaluates_siblings {
                    if let Some(validator) = compile(ctx, object, value) {
                        body.keywords.push((kind, validator?));
                    }
                }
                continue;
            }
        }
        if !draft.is_known_keyword(keyword) && value.is_object() {
            // Unknown keywords carry no validation meaning, but references may point into them
            let location = ctx.location.join(keyword);
            match ctx.compile_at(location, value) {
                Ok(id) => body.unknown.push((keyword.clone(), id)),
                Err(error) => tracing::trace!(keyword, %error, "Skipping non-schema value"),
            }
        }
    }
    link(&mut body.keywords);
    Ok(body)
}

fn expect_str<'v>(
    ctx: &Context<'_>,
    keyword: &'static str,
    value: &'v Value,
) -> Result<&'v str, SchemaError> {
    value
        .as_str()
        .ok_or_else(|| ctx.invalid(keyword, "expected a string"))
}

fn link(keywords: &mut [(KeywordKind, BoxedValidator)]) {
    let mut siblings = Siblings::default();
    for (_, keyword) in keywords.iter() {
        keyword.collect_siblings(&mut siblings);
    }
    for (_, keyword) in keywords.iter_mut() {
        keyword.link(&siblings);
    }
}

/// Second loading pass: base URIs, resource registration, anchors and reference targets.
fn assign_uris(
    arena: &mut SchemaArena,
    registry: &mut Registry,
    id: NodeId,
    base: &Arc<str>,
    owner: NodeId,
) -> Result<(), SchemaError> {
    let (base, owner) = match arena.resource_mut(id) {
        Some(resource) => {
            let resolved = match &resource.raw_id {
                Some(raw) => uri::resolve(base, raw)?,
                None => base.to_string(),
            };
            let resolved: Arc<str> = Arc::from(uri::without_fragment(&resolved));
            resource.base_uri = Arc::clone(&resolved);
            registry.insert(resolved.to_string(), id)?;
            (resolved, id)
        }
        None => (Arc::clone(base), owner),
    };
    let Some(body) = arena.body_mut(id) else {
        return Ok(());
    };
    for reference in [&mut body.reference, &mut body.dynamic_reference]
        .into_iter()
        .flatten()
    {
        reference.uri = Arc::from(uri::resolve(&base, &reference.raw)?);
    }
    let anchor = body.anchor.clone();
    let dynamic_anchor = body.dynamic_anchor.clone();
    let children = body.children();
    if let Some(resource) = arena.resource_mut(owner) {
        if let Some(name) = anchor {
            resource.anchors.entry(name).or_insert(id);
        }
        if let Some(name) = dynamic_anchor {
            resource.anchors.entry(name.clone()).or_insert(id);
            resource.dynamic_anchors.entry(name).or_insert(id);
        }
    }
    for child in children {
        assign_uris(arena, registry, child, &base, owner)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn load(schema: &Value) -> Result<(SchemaArena, Registry, NodeId), SchemaError> {
        let options = ValidationOptions::default();
        let mut arena = SchemaArena::default();
        let mut registry = Registry::default();
        let root = compile_document(
            &mut arena,
            &mut registry,
            &options,
            schema,
            uri::DEFAULT_ROOT_URI,
        )?;
        Ok((arena, registry, root))
    }

    #[test]
    fn embedded_resources_are_registered() {
        let (arena, registry, root) = load(&json!({
            "$id": "https://example.com/schemas/root.json",
            "$defs": {
                "a": {"$id": "a.json", "$defs": {"b": {"$id": "nested/b.json"}}},
                "c": {"$id": "urn:example:c"}
            }
        }))
        .expect("Valid schema");
        assert_eq!(registry.get("https://example.com/schemas/root.json"), Some(root));
        assert!(registry.get("https://example.com/schemas/a.json").is_some());
        assert!(registry
            .get("https://example.com/schemas/nested/b.json")
            .is_some());
        assert!(registry.get("urn:example:c").is_some());
        assert_eq!(registry.len(), 4);
        assert_eq!(
            arena.base_uri(root).map(|uri| &**uri),
            Some("https://example.com/schemas/root.json")
        );
    }

    #[test]
    fn root_without_id_uses_default_uri() {
        let (_, registry, root) = load(&json!({"type": "string"})).expect("Valid schema");
        assert_eq!(registry.get(uri::DEFAULT_ROOT_URI), Some(root));
    }

    #[test]
    fn boolean_root_is_registered() {
        let (_, registry, root) = load(&json!(false)).expect("Valid schema");
        assert_eq!(registry.get(uri::DEFAULT_ROOT_URI), Some(root));
    }

    #[test]
    fn duplicate_ids_fault() {
        let result = load(&json!({
            "$defs": {
                "a": {"$id": "https://example.com/same"},
                "b": {"$id": "https://example.com/same"}
            }
        }));
        assert!(matches!(result, Err(SchemaError::DuplicateResource { .. })));
    }

    #[test]
    fn anchors_belong_to_enclosing_resource() {
        let (arena, registry, root) = load(&json!({
            "$defs": {
                "a": {"$anchor": "top"},
                "inner": {
                    "$id": "https://example.com/inner",
                    "$defs": {"b": {"$dynamicAnchor": "node"}}
                }
            }
        }))
        .expect("Valid schema");
        let root_resource = arena.resource(root).expect("Resource");
        assert!(root_resource.anchors.contains_key("top"));
        assert!(!root_resource.anchors.contains_key("node"));
        let inner = registry.get("https://example.com/inner").expect("Registered");
        let inner_resource = arena.resource(inner).expect("Resource");
        assert!(inner_resource.anchors.contains_key("node"));
        assert!(inner_resource.dynamic_anchors.contains_key("node"));
    }

    #[test]
    fn references_resolve_against_enclosing_base() {
        let (arena, registry, _) = load(&json!({
            "$id": "https://example.com/root/",
            "$defs": {
                "inner": {"$id": "inner/", "$ref": "leaf.json#/x"}
            }
        }))
        .expect("Valid schema");
        let inner = registry.get("https://example.com/root/inner/").expect("Registered");
        let reference = arena
            .body(inner)
            .and_then(|body| body.reference.as_ref())
            .expect("Reference");
        assert_eq!(&*reference.uri, "https://example.com/root/inner/leaf.json#/x");
    }

    #[test]
    fn draft7_ref_ignores_siblings() {
        let (arena, _, root) = load(&json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$ref": "#/definitions/a",
            "definitions": {"a": {"type": "integer"}},
            "maximum": 5
        }))
        .expect("Valid schema");
        let body = arena.body(root).expect("Object schema");
        assert!(body.keywords.is_empty());
        assert!(body.definition("a").is_some());
    }

    #[test_case(json!(1))]
    #[test_case(json!({"properties": {"a": "string"}}))]
    #[test_case(json!({"allOf": {}}))]
    #[test_case(json!({"$ref": 5}))]
    #[test_case(json!({"$schema": "http://json-schema.org/draft-03/schema#"}))]
    fn invalid_schemas(schema: Value) {
        assert!(load(&schema).is_err());
    }

    #[test]
    fn unknown_keyword_values_are_best_effort() {
        let (arena, _, root) = load(&json!({
            "x-meta": {"type": 12},
            "x-schema": {"type": "string"}
        }))
        .expect("Valid schema");
        let body = arena.body(root).expect("Object schema");
        assert_eq!(body.unknown.len(), 1);
        assert_eq!(body.unknown[0].0, "x-schema");
    }
}
