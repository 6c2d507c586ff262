//! Resolution of `$ref`, `$dynamicRef` and `$recursiveRef` to schema nodes.
use crate::{
    error::SchemaError,
    node::{NodeId, SchemaArena},
    paths::pointer_tokens,
    registry::Registry,
    uri,
};

/// A reference target together with the resource that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolved {
    pub(crate) resource: NodeId,
    pub(crate) target: NodeId,
}

#[derive(Clone, Copy)]
pub(crate) struct Resolver<'s> {
    arena: &'s SchemaArena,
    registry: &'s Registry,
}

impl<'s> Resolver<'s> {
    pub(crate) const fn new(arena: &'s SchemaArena, registry: &'s Registry) -> Self {
        Resolver { arena, registry }
    }

    /// Resolve a full URI statically.
    ///
    /// The fragment is tried as a JSON pointer, then as a path into the local definitions, then
    /// as a plain-name anchor.
    pub(crate) fn lookup(&self, full_uri: &str) -> Result<Resolved, SchemaError> {
        let (base, fragment) = uri::split_fragment(full_uri);
        let resource = self
            .registry
            .get(base)
            .ok_or_else(|| SchemaError::unresolvable(full_uri))?;
        if fragment.is_empty() {
            return Ok(Resolved {
                resource,
                target: resource,
            });
        }
        let fragment = uri::decode_fragment(fragment);
        self.by_pointer(resource, &fragment)
            .or_else(|| self.by_definition(resource, &fragment))
            .or_else(|| self.by_anchor(resource, &fragment))
            .ok_or_else(|| SchemaError::unresolvable(full_uri))
    }

    fn by_pointer(&self, resource: NodeId, fragment: &str) -> Option<Resolved> {
        let tokens = pointer_tokens(fragment)?;
        let (owner, target) = self.arena.descend(resource, &tokens)?;
        Some(Resolved {
            resource: owner,
            target,
        })
    }

    fn by_definition(&self, resource: NodeId, fragment: &str) -> Option<Resolved> {
        let path = fragment.strip_prefix('/').unwrap_or(fragment);
        let path = path
            .strip_prefix("$defs/")
            .or_else(|| path.strip_prefix("definitions/"))
            .unwrap_or(path);
        let (name, rest) = match path.split_once('/') {
            Some((name, rest)) => (name, Some(rest)),
            None => (path, None),
        };
        let definition = self.arena.body(resource)?.definition(name)?;
        match rest {
            None => Some(Resolved {
                resource: self.owner_of(definition, resource),
                target: definition,
            }),
            Some(rest) => {
                let pointer = format!("/{rest}");
                let tokens = pointer_tokens(&pointer)?;
                let (owner, target) = self.arena.descend(definition, &tokens)?;
                Some(Resolved {
                    resource: self.owner_of(owner, resource),
                    target,
                })
            }
        }
    }

    fn by_anchor(&self, resource: NodeId, name: &str) -> Option<Resolved> {
        let target = *self.arena.resource(resource)?.anchors.get(name)?;
        Some(Resolved {
            resource: self.owner_of(target, resource),
            target,
        })
    }

    fn owner_of(&self, candidate: NodeId, fallback: NodeId) -> NodeId {
        if self.arena.resource(candidate).is_some() {
            candidate
        } else {
            fallback
        }
    }

    /// Resolve `$dynamicRef` against the live dynamic scope, outermost resource first.
    pub(crate) fn lookup_dynamic(
        &self,
        full_uri: &str,
        scope: &[NodeId],
    ) -> Result<Resolved, SchemaError> {
        let fallback = self.lookup(full_uri)?;
        let (_, fragment) = uri::split_fragment(full_uri);
        let name = uri::decode_fragment(fragment);
        if name.is_empty() || name.starts_with('/') {
            return Ok(fallback);
        }
        let dynamic_anchor = |resource: NodeId| {
            self.arena
                .resource(resource)
                .and_then(|data| data.dynamic_anchors.get(name.as_ref()))
                .map(|&target| Resolved { resource, target })
        };
        Ok(scope
            .iter()
            .find_map(|&resource| dynamic_anchor(resource))
            .or_else(|| dynamic_anchor(fallback.resource))
            .unwrap_or(fallback))
    }

    /// Resolve `$recursiveRef`.
    ///
    /// When the statically resolved resource sets `$recursiveAnchor: true`, the scope is walked
    /// from the innermost resource outwards for as long as resources keep setting it. The
    /// outermost resource of that run is the target.
    pub(crate) fn lookup_recursive(
        &self,
        full_uri: &str,
        scope: &[NodeId],
    ) -> Result<Resolved, SchemaError> {
        let mut resolved = self.lookup(full_uri)?;
        if !self.is_recursive_anchor(resolved.resource) {
            return Ok(resolved);
        }
        for &resource in scope.iter().rev() {
            if !self.is_recursive_anchor(resource) {
                break;
            }
            resolved = Resolved {
                resource,
                target: resource,
            };
        }
        Ok(resolved)
    }

    fn is_recursive_anchor(&self, resource: NodeId) -> bool {
        self.arena
            .body(resource)
            .is_some_and(|body| body.recursive_anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compiler, options::ValidationOptions};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn load(schema: &Value) -> (SchemaArena, Registry, NodeId) {
        let options = ValidationOptions::default();
        let mut arena = SchemaArena::default();
        let mut registry = Registry::default();
        let root = compiler::compile_document(
            &mut arena,
            &mut registry,
            &options,
            schema,
            uri::DEFAULT_ROOT_URI,
        )
        .expect("Valid schema");
        (arena, registry, root)
    }

    #[test_case("json-schema:///#/$defs/a"; "pointer")]
    #[test_case("json-schema:///#a"; "definition name")]
    #[test_case("json-schema:///#/definitions/a"; "definitions table")]
    #[test_case("json-schema:///#plain"; "anchor")]
    #[test_case("json-schema:///#/$defs/with%20space"; "percent encoded")]
    fn static_lookup(uri: &str) {
        let (arena, registry, root) = load(&json!({
            "$defs": {
                "a": {"$anchor": "plain", "type": "integer"},
                "with space": {"type": "null"}
            }
        }));
        let resolved = Resolver::new(&arena, &registry)
            .lookup(uri)
            .expect("Resolvable");
        assert_eq!(resolved.resource, root);
        assert_ne!(resolved.target, root);
    }

    #[test]
    fn path_below_a_definition_name() {
        let (arena, registry, root) = load(&json!({
            "$defs": {"nested": {"properties": {"b": {"type": "string"}}}}
        }));
        let resolver = Resolver::new(&arena, &registry);
        let resolved = resolver
            .lookup("json-schema:///#nested/properties/b")
            .expect("Resolvable");
        assert_eq!(resolved.resource, root);
        let expected = resolver
            .lookup("json-schema:///#/$defs/nested/properties/b")
            .expect("Resolvable");
        assert_eq!(resolved.target, expected.target);
    }

    #[test_case("json-schema:///#/$defs/missing")]
    #[test_case("json-schema:///#nothing")]
    #[test_case("https://unknown.example.com/schema")]
    fn unresolvable(uri: &str) {
        let (arena, registry, _) = load(&json!({"$defs": {"a": true}}));
        assert!(matches!(
            Resolver::new(&arena, &registry).lookup(uri),
            Err(SchemaError::UnresolvableReference { .. })
        ));
    }

    #[test]
    fn empty_fragment_targets_resource() {
        let (arena, registry, root) = load(&json!({"$id": "https://example.com/root"}));
        let resolved = Resolver::new(&arena, &registry)
            .lookup("https://example.com/root")
            .expect("Resolvable");
        assert_eq!(resolved, Resolved { resource: root, target: root });
    }

    #[test]
    fn dynamic_lookup_prefers_outermost_scope() {
        let (arena, registry, root) = load(&json!({
            "$id": "https://example.com/outer",
            "$dynamicAnchor": "node",
            "$defs": {
                "inner": {
                    "$id": "https://example.com/inner",
                    "$dynamicAnchor": "node"
                }
            }
        }));
        let resolver = Resolver::new(&arena, &registry);
        let inner = registry.get("https://example.com/inner").expect("Registered");
        let with_outer = resolver
            .lookup_dynamic("https://example.com/inner#node", &[root, inner])
            .expect("Resolvable");
        assert_eq!(with_outer.target, root);
        let inner_only = resolver
            .lookup_dynamic("https://example.com/inner#node", &[inner])
            .expect("Resolvable");
        assert_eq!(inner_only.target, inner);
    }

    #[test]
    fn recursive_lookup_walks_anchored_run() {
        let (arena, registry, root) = load(&json!({
            "$schema": "https://json-schema.org/draft/2019-09/schema",
            "$id": "https://example.com/root",
            "$recursiveAnchor": true,
            "$defs": {
                "tree": {"$id": "https://example.com/tree", "$recursiveAnchor": true},
                "plain": {"$id": "https://example.com/plain"}
            }
        }));
        let resolver = Resolver::new(&arena, &registry);
        let tree = registry.get("https://example.com/tree").expect("Registered");
        let plain = registry.get("https://example.com/plain").expect("Registered");
        let resolved = resolver
            .lookup_recursive("https://example.com/tree", &[root, tree])
            .expect("Resolvable");
        assert_eq!(resolved.target, root);
        let resolved = resolver
            .lookup_recursive("https://example.com/tree", &[plain, tree])
            .expect("Resolvable");
        assert_eq!(resolved.target, tree);
        let resolved = resolver
            .lookup_recursive("https://example.com/plain", &[root, plain])
            .expect("Resolvable");
        assert_eq!(resolved.target, plain);
    }
}
