use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::{helpers::Limit, CompilationResult},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

pub(crate) struct MinimumValidator {
    limit: Limit,
    limit_value: Value,
}

impl Validate for MinimumValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Number(item) = instance {
            if matches!(self.limit.compare(item), Some(Ordering::Less)) {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::Minimum {
                            limit: self.limit_value.clone(),
                        },
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
    Some(Limit::compile(ctx, "minimum", schema).map(|limit| {
        Box::new(MinimumValidator {
            limit,
            limit_value: schema.clone(),
        }) as _
    }))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minimum": 1_u64 << 54}), &json!((1_u64 << 54) - 1))]
    #[test_case(&json!({"minimum": 1_i64 << 54}), &json!((1_i64 << 54) - 1))]
    #[test_case(&json!({"minimum": -1.5}), &json!(-2))]
    #[test_case(&json!({"minimum": 0}), &json!(-0.5))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"minimum": 5}), &json!(5))]
    #[test_case(&json!({"minimum": 5}), &json!(5.0))]
    #[test_case(&json!({"minimum": -1.5}), &json!(-1))]
    #[test_case(&json!({"minimum": 5}), &json!("1"); "ignores non-numbers")]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn message() {
        tests_util::expect_errors(&json!({"minimum": 5}), &json!(1), &["1 is less than the minimum of 5"]);
    }

    #[test]
    fn schema_location() {
        tests_util::assert_schema_location(&json!({"minimum": 5}), &json!(1), "/minimum");
    }
}
