use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::{helpers::string_array, CompilationResult},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

pub(crate) struct RequiredValidator {
    required: Vec<String>,
}

impl RequiredValidator {
    pub(crate) fn new(required: Vec<String>) -> RequiredValidator {
        RequiredValidator { required }
    }

    /// One error per missing property, or only the first one in fail-fast mode.
    pub(crate) fn check<'i>(
        &self,
        item: &Map<String, Value>,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &ValidationContext<'_>,
    ) -> Evaluation<'i> {
        let mut collector = ctx.collector();
        for property in &self.required {
            if !item.contains_key(property) {
                let error = ctx.error(
                    instance,
                    location,
                    ValidationErrorKind::Required {
                        // Value is needed for proper string escaping
                        property: Value::String(property.clone()),
                    },
                );
                if collector.push(error.into()) {
                    break;
                }
            }
        }
        collector.finish()
    }
}

impl Validate for RequiredValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        match instance {
            Value::Object(item) => Ok(self.check(item, instance, location, ctx)),
            _ => Ok(Evaluation::Valid),
        }
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(string_array(ctx, "required", schema).map(|required| {
        Box::new(RequiredValidator::new(required)) as _
    }))
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, OutputMode};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"required": ["a"]}), &json!({"a": null}))]
    #[test_case(&json!({"required": []}), &json!({}))]
    #[test_case(&json!({"required": ["a"]}), &json!(["a"]); "ignores non-objects")]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"required": ["a"]}), &json!({"b": 1}))]
    #[test_case(&json!({"required": ["a", "b"]}), &json!({"a": 1}))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn every_missing_property_is_reported() {
        tests_util::expect_errors(
            &json!({"required": ["a", "b", "c"]}),
            &json!({"b": 1}),
            &[r#""a" is a required property"#, r#""c" is a required property"#],
        );
        let errors = tests_util::errors(
            &json!({"required": ["a", "b", "c"]}),
            &json!({"b": 1}),
            OutputMode::FailFast,
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn invalid_schema() {
        assert!(crate::validator_for(&json!({"required": ["a", 1]})).is_err());
    }
}
