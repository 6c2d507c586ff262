use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    keywords::{CompilationResult, Siblings},
    node::{NodeId, Subschemas},
    output::EvaluationResult,
    paths::LazyLocation,
    validator::Validate,
};

pub(crate) struct PropertiesValidator {
    properties: Vec<(String, NodeId)>,
}

impl Validate for PropertiesValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        if let Value::Object(item) = instance {
            for (name, node) in &self.properties {
                let Some(value) = item.get(name) else {
                    continue;
                };
                let evaluation = ctx.in_segment(name, |ctx| {
                    ctx.evaluate(*node, value, &location.push(name))
                })?;
                if collector.push(evaluation) {
                    break;
                }
            }
        }
        Ok(collector.finish())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::Map(&self.properties)
    }

    fn collect_siblings(&self, siblings: &mut Siblings) {
        siblings
            .properties
            .extend(self.properties.iter().map(|(name, _)| name.clone()));
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(
        ctx.compile_map("properties", schema)
            .map(|properties| Box::new(PropertiesValidator { properties }) as _),
    )
}
