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

pub(crate) struct MinItemsValidator {
    limit: u64,
}

impl Validate for MinItemsValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Array(items) = instance {
            if (items.len() as u64) < self.limit {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::MinItems { limit: self.limit },
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
    Some(non_negative_integer(ctx, "minItems", schema).map(|limit| Box::new(MinItemsValidator { limit }) as _))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minItems": 1}), &json!([1]))]
    #[test_case(&json!({"minItems": 0}), &json!([]))]
    #[test_case(&json!({"minItems": 1}), &json!(""); "ignores non-arrays")]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"minItems": 1}), &json!([]))]
    #[test_case(&json!({"minItems": 3.0}), &json!([1, 2]))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn message() {
        tests_util::expect_errors(&json!({"minItems": 1}), &json!([]), &["[] has less than 1 item"]);
    }
}
