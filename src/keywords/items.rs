use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    draft::Draft,
    keywords::{CompilationResult, Siblings},
    node::{NodeId, Subschemas},
    output::EvaluationResult,
    paths::LazyLocation,
    validator::Validate,
};

/// Applies one schema to every item from `skip` onwards.
///
/// `skip` is the number of positions covered by a sibling `prefixItems`.
pub(crate) struct ItemsValidator {
    node: NodeId,
    skip: usize,
}

impl Validate for ItemsValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        if let Value::Array(items) = instance {
            for (idx, item) in items.iter().enumerate().skip(self.skip) {
                let evaluation = ctx.evaluate(self.node, item, &location.push(idx))?;
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

    fn link(&mut self, siblings: &Siblings) {
        self.skip = siblings.prefix_items;
    }
}

/// Array-form `items`: one schema per position.
pub(crate) struct ItemsArrayValidator {
    nodes: Vec<NodeId>,
}

impl Validate for ItemsArrayValidator {
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
        siblings.items_tuple = true;
        siblings.prefix_items = self.nodes.len();
    }
}

/// Evaluate item `idx` against `nodes[idx]`, items past the end are left alone.
pub(crate) fn evaluate_positions<'s, 'i>(
    nodes: &'s [NodeId],
    instance: &'i Value,
    location: &LazyLocation,
    ctx: &mut ValidationContext<'s>,
) -> EvaluationResult<'i> {
    let mut collector = ctx.collector();
    if let Value::Array(items) = instance {
        for (idx, (node, item)) in nodes.iter().zip(items).enumerate() {
            let evaluation =
                ctx.in_segment(idx, |ctx| ctx.evaluate(*node, item, &location.push(idx)))?;
            if collector.push(evaluation) {
                break;
            }
        }
    }
    Ok(collector.finish())
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    match schema {
        Value::Array(_) if ctx.draft() == Draft::Draft202012 => Some(Err(ctx.invalid(
            "items",
            "array form is replaced by 'prefixItems' in this dialect",
        ))),
        Value::Array(_) => Some(
            ctx.compile_list("items", schema)
                .map(|nodes| Box::new(ItemsArrayValidator { nodes }) as _),
        ),
        _ => Some(ctx.compile_subschema("items", schema).map(|node| {
            Box::new(ItemsValidator { node, skip: 0 }) as _
        })),
    }
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft, OutputMode, SchemaError};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, 2, 3]))]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!([]))]
    #[test_case(&json!({"items": false}), &json!([]))]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!({"a": "b"}); "ignores non-arrays")]
    #[test_case(&json!({"prefixItems": [{"type": "string"}], "items": {"type": "integer"}}), &json!(["a", 1, 2]))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, "2"]))]
    #[test_case(&json!({"items": false}), &json!([1]))]
    #[test_case(&json!({"prefixItems": [{"type": "string"}], "items": false}), &json!(["a", 1]))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"items": [{"type": "string"}, {"type": "integer"}]}), &json!(["a", 1, null]); "draft 7")]
    #[test_case(&json!({"items": [{"type": "string"}]}), &json!([]); "shorter than tuple")]
    fn tuple_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid_with_draft(Draft::Draft7, schema, instance);
        tests_util::is_valid_with_draft(Draft::Draft201909, schema, instance);
    }

    #[test]
    fn tuple_is_not_valid() {
        tests_util::is_not_valid_with_draft(
            Draft::Draft7,
            &json!({"items": [{"type": "string"}, {"type": "integer"}]}),
            &json!(["a", "b"]),
        );
    }

    #[test]
    fn array_form_is_rejected_in_2020() {
        let result = crate::draft202012::new(&json!({"items": [{"type": "string"}]}));
        assert!(matches!(result, Err(SchemaError::InvalidKeyword { keyword: "items", .. })));
    }

    #[test]
    fn locations() {
        let errors = tests_util::errors(
            &json!({"items": {"minimum": 2}}),
            &json!([5, 1, 0]),
            OutputMode::List,
        );
        let paths: Vec<_> = errors
            .iter()
            .map(|error| (error.instance_path.as_str(), error.schema_path.as_str()))
            .collect();
        assert_eq!(paths, [("/1", "/items/minimum"), ("/2", "/items/minimum")]);
    }

    #[test]
    fn tuple_schema_location() {
        let errors = tests_util::errors(
            &json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "items": [true, {"type": "string"}]
            }),
            &json!([1, 2]),
            OutputMode::List,
        );
        assert_eq!(errors[0].schema_path.as_str(), "/items/1/type");
    }
}
