//! Loaded schema documents and the keyword evaluation trait.
//!
//! A document is compiled once into an arena of nodes. Each node owns the evaluators of its
//! keywords and refers to subschemas by index, so validation only ever borrows the document.
use std::sync::Arc;

use serde_json::Value;

use crate::{
    compiler,
    context::ValidationContext,
    draft::Draft,
    error::SchemaError,
    keywords::Siblings,
    node::{NodeId, SchemaArena, Subschemas},
    options::ValidationOptions,
    output::{EvaluationResult, Outcome, OutputMode},
    paths::LazyLocation,
    registry::Registry,
};

/// The Validate trait represents a predicate over some JSON value, usually one keyword of a
/// schema object.
///
/// Composite keywords hold the [`NodeId`]s of their subschemas and evaluate them through the
/// [`ValidationContext`], which keeps track of the schema path and the dynamic scope.
///
/// `collect_siblings` and `link` run once after a schema object is compiled. The first lets a
/// keyword describe what it covers, the second lets a keyword read what the others cover.
/// Keywords like `additionalProperties` depend on this, the rest keep the default no-ops.
pub(crate) trait Validate: Send + Sync {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i>;

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::None
    }

    fn collect_siblings(&self, _siblings: &mut Siblings) {}

    fn link(&mut self, _siblings: &Siblings) {}
}

/// A compiled schema, ready for validating instances.
///
/// The document is immutable after loading apart from [`SchemaDocument::add_external_document`]
/// and can be shared between threads.
///
/// ```rust
/// use schemascope::OutputMode;
///
/// let document = schemascope::compile(r#"{"type": "integer", "minimum": 1}"#)
///     .expect("A valid schema");
/// assert!(document.validate("5", OutputMode::FailFast).expect("No faults").is_valid());
/// assert!(!document.validate("0", OutputMode::FailFast).expect("No faults").is_valid());
/// ```
pub struct SchemaDocument {
    arena: SchemaArena,
    registry: Registry,
    root: NodeId,
    config: Arc<ValidationOptions>,
}

impl SchemaDocument {
    /// Create default [`ValidationOptions`] to configure a document.
    #[must_use]
    pub fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    pub(crate) fn new(config: ValidationOptions, schema: &Value) -> Result<Self, SchemaError> {
        let mut arena = SchemaArena::default();
        let mut registry = Registry::default();
        let root = compiler::compile_document(
            &mut arena,
            &mut registry,
            &config,
            schema,
            config.base_uri(),
        )?;
        Ok(SchemaDocument {
            arena,
            registry,
            root,
            config: Arc::new(config),
        })
    }

    /// Parse and register another schema document so references can point into it.
    ///
    /// The document is addressed by its root `$id`, which should be absolute.
    ///
    /// # Errors
    ///
    /// Fails on malformed text, on an invalid schema, and when any of the document's resource
    /// URIs is already registered. On failure no resource of the document becomes visible.
    pub fn add_external_document(&mut self, text: &str) -> Result<(), SchemaError> {
        let schema: Value = serde_json::from_str(text)?;
        self.add_external_value(&schema)
    }

    /// Same as [`SchemaDocument::add_external_document`], for an already parsed schema.
    ///
    /// # Errors
    ///
    /// See [`SchemaDocument::add_external_document`].
    pub fn add_external_value(&mut self, schema: &Value) -> Result<(), SchemaError> {
        let mut registry = Registry::default();
        let root = compiler::compile_document(
            &mut self.arena,
            &mut registry,
            &self.config,
            schema,
            self.config.base_uri(),
        )?;
        let resources = registry.len();
        self.registry.merge(registry)?;
        tracing::debug!(
            base_uri = self.arena.base_uri(root).map(|uri| &**uri),
            resources,
            "Registered external schema document"
        );
        Ok(())
    }

    /// Parse `instance` and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] on malformed input, and other variants on faults raised
    /// during evaluation such as unresolvable references or infinite recursion.
    pub fn validate(&self, instance: &str, mode: OutputMode) -> Result<Outcome<'static>, SchemaError> {
        let instance: Value = serde_json::from_str(instance)?;
        Ok(self.validate_value(&instance, mode)?.into_owned())
    }

    /// Validate an already parsed instance.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] on faults raised during evaluation.
    pub fn validate_value<'i>(
        &self,
        instance: &'i Value,
        mode: OutputMode,
    ) -> Result<Outcome<'i>, SchemaError> {
        let mut ctx = ValidationContext::new(&self.arena, &self.registry, &self.config, mode);
        let evaluation = ctx.evaluate(self.root, instance, &LazyLocation::new())?;
        Ok(evaluation.into_outcome())
    }

    /// Whether `instance` is valid, without collecting error details.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] on faults raised during evaluation.
    pub fn is_valid(&self, instance: &Value) -> Result<bool, SchemaError> {
        let mut ctx =
            ValidationContext::new(&self.arena, &self.registry, &self.config, OutputMode::FailFast);
        ctx.probe(self.root, instance, &LazyLocation::new())
    }

    /// The dialect of the root schema.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.arena
            .body(self.root)
            .map_or_else(|| self.config.draft(), |body| body.draft)
    }

    /// The options the document was built with.
    #[must_use]
    pub fn config(&self) -> &ValidationOptions {
        &self.config
    }
}

impl std::fmt::Debug for SchemaDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaDocument")
            .field("nodes", &self.arena.len())
            .field("resources", &self.registry.len())
            .field("config", &self.config)
            .finish()
    }
}
