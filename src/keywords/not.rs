use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::CompilationResult,
    node::{NodeId, Subschemas},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

pub(crate) struct NotValidator {
    // The original value, used for error messages
    original: Value,
    node: NodeId,
}

impl Validate for NotValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if ctx.probe(self.node, instance, location)? {
            Ok(ctx
                .error(
                    instance,
                    location,
                    ValidationErrorKind::Not {
                        schema: self.original.clone(),
                    },
                )
                .into())
        } else {
            Ok(Evaluation::Valid)
        }
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::Single(self.node)
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(ctx.compile_subschema("not", schema).map(|node| {
        Box::new(NotValidator {
            original: schema.clone(),
            node,
        }) as _
    }))
}
