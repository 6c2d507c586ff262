use std::sync::Arc;

use serde_json::Value;

use crate::{context::ValidationContext, output::EvaluationResult, paths::LazyLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceKind {
    /// `$ref`
    Static,
    /// `$dynamicRef`
    Dynamic,
    /// `$recursiveRef`
    Recursive,
}

impl ReferenceKind {
    const fn keyword(self) -> &'static str {
        match self {
            ReferenceKind::Static => "$ref",
            ReferenceKind::Dynamic => "$dynamicRef",
            ReferenceKind::Recursive => "$recursiveRef",
        }
    }
}

/// A reference kept by URI.
///
/// The target is looked up on every evaluation, which keeps the schema tree acyclic and lets
/// dynamic references depend on the scope they are reached through.
#[derive(Debug)]
pub(crate) struct Reference {
    pub(crate) kind: ReferenceKind,
    /// The reference as written in the schema.
    pub(crate) raw: String,
    /// Absolute URI, set once base URIs are known.
    pub(crate) uri: Arc<str>,
}

impl Reference {
    pub(crate) fn new(kind: ReferenceKind, raw: &str) -> Reference {
        Reference {
            kind,
            raw: raw.to_string(),
            uri: Arc::from(""),
        }
    }

    pub(crate) fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        ctx.in_keyword(self.kind.keyword(), |ctx| {
            let resolver = ctx.resolver();
            let resolved = match self.kind {
                ReferenceKind::Static => resolver.lookup(&self.uri)?,
                ReferenceKind::Dynamic => resolver.lookup_dynamic(&self.uri, ctx.dynamic_scope())?,
                ReferenceKind::Recursive => {
                    resolver.lookup_recursive(&self.uri, ctx.dynamic_scope())?
                }
            };
            ctx.follow(resolved, &self.uri, instance, location)
        })
    }
}
