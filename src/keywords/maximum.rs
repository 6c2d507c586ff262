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

pub(crate) struct MaximumValidator {
    limit: Limit,
    limit_value: Value,
}

impl Validate for MaximumValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Number(item) = instance {
            if matches!(self.limit.compare(item), Some(Ordering::Greater)) {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::Maximum {
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
    Some(Limit::compile(ctx, "maximum", schema).map(|limit| {
        Box::new(MaximumValidator {
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

    #[test_case(&json!({"maximum": 1_u64 << 54}), &json!((1_u64 << 54) + 1))]
    #[test_case(&json!({"maximum": -(1_i64 << 54)}), &json!(-(1_i64 << 54) + 1))]
    #[test_case(&json!({"maximum": 2.5}), &json!(3))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"maximum": 3}), &json!(3.0))]
    #[test_case(&json!({"maximum": 2.5}), &json!(-10))]
    #[test_case(&json!({"maximum": 3}), &json!([10]))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn schema_location() {
        tests_util::assert_schema_location(&json!({"maximum": 5}), &json!(10), "/maximum");
    }
}
