use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::CompilationResult,
    node::{NodeId, Subschemas},
    output::{Evaluation, EvaluationResult, OutputMode},
    paths::LazyLocation,
    validator::Validate,
};

/// Stops at the first passing member.
///
/// When every member fails, fail-fast mode reports the last member's error. List mode reports
/// the errors of all members followed by the `anyOf` error itself.
pub(crate) struct AnyOfValidator {
    schemas: Vec<NodeId>,
}

impl Validate for AnyOfValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut failures = Vec::new();
        for (idx, node) in self.schemas.iter().enumerate() {
            let evaluation = ctx.in_segment(idx, |ctx| ctx.evaluate(*node, instance, location))?;
            if evaluation.is_valid() {
                return Ok(Evaluation::Valid);
            }
            failures.push(evaluation);
        }
        if ctx.mode() == OutputMode::FailFast {
            if let Some(last) = failures.pop() {
                return Ok(last);
            }
        }
        let mut collector = ctx.collector();
        for failure in failures {
            collector.push(failure);
        }
        collector.push_error(ctx.error(instance, location, ValidationErrorKind::AnyOf));
        Ok(collector.finish())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::List(&self.schemas)
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(
        ctx.compile_non_empty_list("anyOf", schema)
            .map(|schemas| Box::new(AnyOfValidator { schemas }) as _),
    )
}
