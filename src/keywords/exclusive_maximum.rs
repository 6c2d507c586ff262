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

pub(crate) struct ExclusiveMaximumValidator {
    limit: Limit,
    limit_value: Value,
}

impl Validate for ExclusiveMaximumValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Number(item) = instance {
            if !matches!(self.limit.compare(item), Some(Ordering::Less)) {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::ExclusiveMaximum {
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
    Some(Limit::compile(ctx, "exclusiveMaximum", schema).map(|limit| {
        Box::new(ExclusiveMaximumValidator {
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

    #[test_case(&json!({"exclusiveMaximum": 3.0}), &json!(3))]
    #[test_case(&json!({"exclusiveMaximum": 3}), &json!(3.5))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"exclusiveMaximum": 3.0}), &json!(2.2))]
    #[test_case(&json!({"exclusiveMaximum": 0}), &json!(-1))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test]
    fn invalid_limit() {
        assert!(crate::validator_for(&json!({"exclusiveMaximum": "3"})).is_err());
    }
}
