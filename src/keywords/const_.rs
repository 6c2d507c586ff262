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

pub(crate) struct ConstValidator {
    value: Value,
}

impl Validate for ConstValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if helpers::equal(instance, &self.value) {
            return Ok(Evaluation::Valid);
        }
        Ok(ctx
            .error(
                instance,
                location,
                ValidationErrorKind::Constant {
                    expected_value: self.value.clone(),
                },
            )
            .into())
    }
}

#[inline]
pub(crate) fn compile(
    _: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(Ok(Box::new(ConstValidator {
        value: schema.clone(),
    })))
}
