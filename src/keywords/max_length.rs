use serde_json::{Map, Value};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::{helpers::non_negative_integer, CompilationResult},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

/// Length is counted in extended grapheme clusters.
pub(crate) struct MaxLengthValidator {
    limit: u64,
}

impl Validate for MaxLengthValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::String(item) = instance {
            let length = item.graphemes(true).count() as u64;
            if length > self.limit {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::MaxLength {
                            limit: self.limit,
                            length,
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
    Some(
        non_negative_integer(ctx, "maxLength", schema)
            .map(|limit| Box::new(MaxLengthValidator { limit }) as _),
    )
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxLength": 1}), &json!("\u{1F469}\u{200D}\u{1F4BB}"); "one emoji sequence")]
    #[test_case(&json!({"maxLength": 2}), &json!("\u{1F4A9}\u{1F4A9}"); "two astral characters")]
    #[test_case(&json!({"maxLength": 0}), &json!(""))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"maxLength": 2}), &json!("abc"))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn schema_location() {
        tests_util::assert_schema_location(&json!({"maxLength": 1}), &json!("ab"), "/maxLength");
    }
}
