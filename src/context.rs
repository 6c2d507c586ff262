//! Per-call validation state.
use std::{borrow::Cow, mem, sync::Arc};

use ahash::AHashSet;
use serde_json::Value;

use crate::{
    error::{SchemaError, ValidationError, ValidationErrorKind},
    node::{NodeId, SchemaArena, SchemaNode},
    options::ValidationOptions,
    output::{ErrorCollector, Evaluation, EvaluationResult, OutputMode},
    paths::{LazyLocation, Location, LocationSegment},
    pattern_cache::{MatchError, Matcher},
    registry::Registry,
    resolver::{Resolved, Resolver},
};

/// Mutable state of a single `validate` call.
///
/// Every push onto one of the stacks happens inside a closure-scoped helper that pops after the
/// closure returns, on the error path too.
pub(crate) struct ValidationContext<'s> {
    arena: &'s SchemaArena,
    registry: &'s Registry,
    config: &'s ValidationOptions,
    mode: OutputMode,
    /// Keyword names, property names and indices descended through.
    schema_path: Vec<LocationSegment<'s>>,
    keywords: Vec<&'static str>,
    /// Resources entered along the call path, outermost first.
    dynamic_scope: Vec<NodeId>,
    /// Resources entered through a reference, with the full reference URI.
    referenced: Vec<(NodeId, &'s Arc<str>)>,
    /// Nesting of property names validated in place of their object.
    name_depth: u32,
    recursion: AHashSet<(NodeId, Location, u32)>,
}

impl<'s> ValidationContext<'s> {
    pub(crate) fn new(
        arena: &'s SchemaArena,
        registry: &'s Registry,
        config: &'s ValidationOptions,
        mode: OutputMode,
    ) -> Self {
        ValidationContext {
            arena,
            registry,
            config,
            mode,
            schema_path: Vec::new(),
            keywords: Vec::new(),
            dynamic_scope: Vec::new(),
            referenced: Vec::new(),
            name_depth: 0,
            recursion: AHashSet::new(),
        }
    }

    pub(crate) fn mode(&self) -> OutputMode {
        self.mode
    }

    pub(crate) fn collector<'i>(&self) -> ErrorCollector<'i> {
        ErrorCollector::new(self.mode)
    }

    pub(crate) fn arena(&self) -> &'s SchemaArena {
        self.arena
    }

    pub(crate) fn resolver(&self) -> Resolver<'s> {
        Resolver::new(self.arena, self.registry)
    }

    pub(crate) fn dynamic_scope(&self) -> &[NodeId] {
        &self.dynamic_scope
    }

    /// Match `text` against `pattern` using the shared cache.
    pub(crate) fn is_match(&self, pattern: &str, text: &str) -> Result<bool, MatchError> {
        self.matcher(pattern)
            .map_err(|error| MatchError::Engine(error.to_string()))?
            .is_match(text)
    }

    fn matcher(&self, pattern: &str) -> Result<Arc<Matcher>, SchemaError> {
        self.config
            .pattern_cache()
            .get(pattern, self.config.pattern_timeout())
    }

    pub(crate) fn in_keyword<R>(
        &mut self,
        keyword: &'static str,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.schema_path.push(LocationSegment::Property(keyword));
        self.keywords.push(keyword);
        let result = f(self);
        self.keywords.pop();
        self.schema_path.pop();
        result
    }

    pub(crate) fn in_segment<R>(
        &mut self,
        segment: impl Into<LocationSegment<'s>>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.schema_path.push(segment.into());
        let result = f(self);
        self.schema_path.pop();
        result
    }

    /// Validate a property name that shares the location of its object.
    ///
    /// The name is a different instance, so reaching a schema already entered for the object is
    /// progress and not recursion.
    pub(crate) fn in_property_name<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.name_depth += 1;
        let result = f(self);
        self.name_depth -= 1;
        result
    }

    pub(crate) fn in_resource<R>(&mut self, resource: NodeId, f: impl FnOnce(&mut Self) -> R) -> R {
        self.dynamic_scope.push(resource);
        let result = f(self);
        self.dynamic_scope.pop();
        result
    }

    /// Evaluate the node `id` against `instance`.
    pub(crate) fn evaluate<'i>(
        &mut self,
        id: NodeId,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> EvaluationResult<'i> {
        let arena = self.arena;
        match arena.get(id) {
            SchemaNode::Boolean(true) => Ok(Evaluation::Valid),
            SchemaNode::Boolean(false) => {
                Ok(self.error(instance, location, ValidationErrorKind::FalseSchema).into())
            }
            SchemaNode::Body(body) => body.evaluate(id, instance, location, self),
        }
    }

    /// Validity of `instance` under the node `id`, without collecting error details.
    pub(crate) fn probe(
        &mut self,
        id: NodeId,
        instance: &Value,
        location: &LazyLocation,
    ) -> Result<bool, SchemaError> {
        let previous = mem::replace(&mut self.mode, OutputMode::FailFast);
        let result = self.evaluate(id, instance, location);
        self.mode = previous;
        result.map(|evaluation| evaluation.is_valid())
    }

    /// Evaluate a reference target.
    ///
    /// Entering the same target at the same instance location twice along one call path can
    /// never terminate, so it is reported as [`SchemaError::InfiniteRecursion`].
    pub(crate) fn follow<'i>(
        &mut self,
        resolved: Resolved,
        uri: &'s Arc<str>,
        instance: &'i Value,
        location: &LazyLocation,
    ) -> EvaluationResult<'i> {
        let key = (resolved.target, Location::from(location), self.name_depth);
        if self.recursion.contains(&key) {
            tracing::debug!(uri = %uri, instance_location = %key.1, "Infinite recursion detected");
            return Err(SchemaError::InfiniteRecursion {
                uri: uri.to_string(),
                instance_location: key.1,
            });
        }
        self.recursion.insert(key.clone());
        self.dynamic_scope.push(resolved.resource);
        self.referenced.push((resolved.resource, uri));
        let result = self.evaluate(resolved.target, instance, location);
        self.referenced.pop();
        self.dynamic_scope.pop();
        self.recursion.remove(&key);
        result
    }

    /// Build an error for the keyword currently being evaluated.
    pub(crate) fn error<'i>(
        &self,
        instance: &'i Value,
        location: &LazyLocation,
        kind: ValidationErrorKind,
    ) -> ValidationError<'i> {
        self.error_with(Cow::Borrowed(instance), location, kind)
    }

    pub(crate) fn error_with<'i>(
        &self,
        instance: Cow<'i, Value>,
        location: &LazyLocation,
        kind: ValidationErrorKind,
    ) -> ValidationError<'i> {
        ValidationError {
            instance,
            kind,
            keyword: self.keywords.last().copied().unwrap_or(""),
            instance_path: Location::from(location),
            schema_path: Location::from_segments(&self.schema_path),
            schema_base_uri: self
                .dynamic_scope
                .last()
                .and_then(|resource| self.arena.base_uri(*resource))
                .cloned(),
            referencing_uri: self.referenced.last().map(|(_, uri)| Arc::clone(uri)),
        }
    }
}
