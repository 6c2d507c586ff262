use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    keywords::CompilationResult,
    node::{NodeId, Subschemas},
    output::EvaluationResult,
    paths::LazyLocation,
    validator::Validate,
};

pub(crate) struct AllOfValidator {
    schemas: Vec<NodeId>,
}

impl Validate for AllOfValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        for (idx, node) in self.schemas.iter().enumerate() {
            let evaluation = ctx.in_segment(idx, |ctx| ctx.evaluate(*node, instance, location))?;
            if collector.push(evaluation) {
                break;
            }
        }
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
        ctx.compile_non_empty_list("allOf", schema)
            .map(|schemas| Box::new(AllOfValidator { schemas }) as _),
    )
}
