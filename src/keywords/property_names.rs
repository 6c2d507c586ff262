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

/// Each member name is validated as a JSON string at the location of the object itself.
pub(crate) struct PropertyNamesValidator {
    node: NodeId,
}

impl Validate for PropertyNamesValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        if let Value::Object(item) = instance {
            for name in item.keys() {
                let wrapper = Value::String(name.clone());
                let evaluation = ctx
                    .in_property_name(|ctx| ctx.evaluate(self.node, &wrapper, location))?
                    .into_owned();
                if collector.push(evaluation) {
                    break;
                }
            }
        }
        Ok(collector.finish())
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
    Some(
        ctx.compile_subschema("propertyNames", schema)
            .map(|node| Box::new(PropertyNamesValidator { node }) as _),
    )
}
