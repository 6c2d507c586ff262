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
pub(crate) struct MinLengthValidator {
    limit: u64,
}

impl Validate for MinLengthValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::String(item) = instance {
            let length = item.graphemes(true).count() as u64;
            if length < self.limit {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::MinLength {
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
        non_negative_integer(ctx, "minLength", schema)
            .map(|limit| Box::new(MinLengthValidator { limit }) as _),
    )
}
