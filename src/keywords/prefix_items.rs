use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    keywords::{items::evaluate_positions, CompilationResult, Siblings},
    node::{NodeId, Subschemas},
    output::EvaluationResult,
    paths::LazyLocation,
    validator::Validate,
};

pub(crate) struct PrefixItemsValidator {
    nodes: Vec<NodeId>,
}

impl Validate for PrefixItemsValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        evaluate_positions(&self.nodes, instance, location, ctx)
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::List(&self.nodes)
    }

    fn collect_siblings(&self, siblings: &mut Siblings) {
        siblings.prefix_items = self.nodes.len();
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(
        ctx.compile_non_empty_list("prefixItems", schema)
            .map(|nodes| Box::new(PrefixItemsValidator { nodes }) as _),
    )
}
