use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::{helpers::non_negative_integer, CompilationResult},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

/// Counts object members, nested objects are not inspected.
pub(crate) struct MaxPropertiesValidator {
    limit: u64,
}

impl Validate for MaxPropertiesValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Object(items) = instance {
            if (items.len() as u64) > self.limit {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::MaxProperties { limit: self.limit },
                    )
                    .into());
            }
        }
        Ok(Evaluation::Valid)
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(non_negative_integer(ctx, "maxProperties", schema).map(|limit| Box::new(MaxPropertiesValidator { limit }) as _))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxProperties": 1}), &json!({"a": 1}))]
    #[test_case(&json!({"maxProperties": 0}), &json!("abc"); "ignores non-objects")]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"maxProperties": 1}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!({"maxProperties": 0}), &json!({"a": null}))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn message() {
        tests_util::expect_errors(&json!({"maxProperties": 1}), &json!({"a": 1, "b": 2}), &["{\"a\":1,\"b\":2} has more than 1 property"]);
    }
}
