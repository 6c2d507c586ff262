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

pub(crate) struct ExclusiveMinimumValidator {
    limit: Limit,
    limit_value: Value,
}

impl Validate for ExclusiveMinimumValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Number(item) = instance {
            if !matches!(self.limit.compare(item), Some(Ordering::Greater)) {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::ExclusiveMinimum {
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
    Some(Limit::compile(ctx, "exclusiveMinimum", schema).map(|limit| {
        Box::new(ExclusiveMinimumValidator {
            limit,
            limit_value: schema.clone(),
        }) as _
    }))
}
