use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::{helpers, CompilationResult},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

#[derive(Debug)]
pub(crate) struct EnumValidator {
    options: Value,
    items: Vec<Value>,
}

impl Validate for EnumValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if self.items.iter().any(|item| helpers::equal(instance, item)) {
            return Ok(Evaluation::Valid);
        }
        Ok(ctx
            .error(
                instance,
                location,
                ValidationErrorKind::Enum {
                    options: self.options.clone(),
                },
            )
            .into())
    }
}

/// An empty `enum` is allowed and rejects everything.
#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    match schema {
        Value::Array(items) => Some(Ok(Box::new(EnumValidator {
            options: schema.clone(),
            items: items.clone(),
        }))),
        _ => Some(Err(ctx.invalid("enum", "expected an array"))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"enum": [1, "a", null]}), &json!(1.0))]
    #[test_case(&json!({"enum": [[1, 2], {"a": [0]}]}), &json!({"a": [0.0]}))]
    #[test_case(&json!({"enum": [false]}), &json!(false))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"enum": [1, "a"]}), &json!(2))]
    #[test_case(&json!({"enum": [false]}), &json!(0); "booleans are not numbers")]
    #[test_case(&json!({"enum": [[1, 2]]}), &json!([2, 1]))]
    #[test_case(&json!({"enum": []}), &json!(null); "empty")]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn message() {
        tests_util::expect_errors(
            &json!({"enum": [1, 2]}),
            &json!(3),
            &["3 is not one of [1,2]"],
        );
    }

    #[test]
    fn invalid_schema() {
        assert!(crate::validator_for(&json!({"enum": 1})).is_err());
    }
}
