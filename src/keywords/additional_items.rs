use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::{CompilationResult, Siblings},
    node::{NodeId, SchemaNode, Subschemas},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

/// Items past an array-form `items`.
///
/// Without a tuple sibling the keyword has no effect.
pub(crate) struct AdditionalItemsValidator {
    node: NodeId,
    tuple: Option<usize>,
}

impl Validate for AdditionalItemsValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let (Some(limit), Value::Array(items)) = (self.tuple, instance) else {
            return Ok(Evaluation::Valid);
        };
        if items.len() <= limit {
            return Ok(Evaluation::Valid);
        }
        if matches!(ctx.arena().get(self.node), SchemaNode::Boolean(false)) {
            return Ok(ctx
                .error(instance, location, ValidationErrorKind::AdditionalItems { limit })
                .into());
        }
        let mut collector = ctx.collector();
        for (idx, item) in items.iter().enumerate().skip(limit) {
            if collector.push(ctx.evaluate(self.node, item, &location.push(idx))?) {
                break;
            }
        }
        Ok(collector.finish())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::Single(self.node)
    }

    fn link(&mut self, siblings: &Siblings) {
        self.tuple = siblings.items_tuple.then_some(siblings.prefix_items);
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(ctx.compile_subschema("additionalItems", schema).map(|node| {
        Box::new(AdditionalItemsValidator { node, tuple: None }) as _
    }))
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!([null, 2, 3]))]
    #[test_case(&json!({"items": [{}, {}], "additionalItems": false}), &json!([1, 2]))]
    #[test_case(&json!({"items": {}, "additionalItems": false}), &json!([1, 2, 3]); "schema form items")]
    #[test_case(&json!({"additionalItems": false}), &json!([1]); "no items")]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid_with_draft(Draft::Draft7, schema, instance);
        tests_util::is_valid_with_draft(Draft::Draft201909, schema, instance);
    }

    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!([null, "2"]))]
    #[test_case(&json!({"items": [{}], "additionalItems": false}), &json!([1, 2]))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid_with_draft(Draft::Draft7, schema, instance);
    }

    #[test]
    fn message() {
        let document = crate::draft7::new(&json!({"items": [{}], "additionalItems": false}))
            .expect("Valid schema");
        let instance = json!([1, 2, 3]);
        let outcome = document
            .validate_value(&instance, crate::OutputMode::List)
            .expect("No faults");
        assert_eq!(
            outcome.errors()[0].to_string(),
            "Additional items are not allowed (2, 3 were unexpected)"
        );
    }
}
