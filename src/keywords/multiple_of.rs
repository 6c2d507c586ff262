use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::CompilationResult,
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

/// Divisors at or below this are too small for a float remainder to mean anything.
const MIN_DIVISOR: f64 = 1e-8;
/// Remainder tolerance, relative to the divisor.
const RELATIVE_TOLERANCE: f64 = 1e-9;

pub(crate) struct MultipleOfFloatValidator {
    multiple_of: f64,
}

impl MultipleOfFloatValidator {
    fn is_multiple(&self, item: f64) -> bool {
        if self.multiple_of <= MIN_DIVISOR {
            return true;
        }
        let remainder = (item % self.multiple_of).abs();
        let tolerance = self.multiple_of * RELATIVE_TOLERANCE;
        remainder <= tolerance || (self.multiple_of - remainder).abs() <= tolerance
    }
}

impl Validate for MultipleOfFloatValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Number(item) = instance {
            if let Some(item) = item.as_f64() {
                if !self.is_multiple(item) {
                    return Ok(ctx
                        .error(
                            instance,
                            location,
                            ValidationErrorKind::MultipleOf {
                                multiple_of: self.multiple_of,
                            },
                        )
                        .into());
                }
            }
        }
        Ok(Evaluation::Valid)
    }
}

/// Exact check for an integral divisor against integral instances.
pub(crate) struct MultipleOfIntegerValidator {
    multiple_of: u64,
    fallback: MultipleOfFloatValidator,
}

impl Validate for MultipleOfIntegerValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Number(item) = instance {
            let exact = if let Some(item) = item.as_u64() {
                Some(item % self.multiple_of == 0)
            } else {
                item.as_i64()
                    .map(|item| item.unsigned_abs() % self.multiple_of == 0)
            };
            match exact {
                Some(true) => {}
                Some(false) => {
                    #[allow(clippy::cast_precision_loss)]
                    let multiple_of = self.multiple_of as f64;
                    return Ok(ctx
                        .error(instance, location, ValidationErrorKind::MultipleOf { multiple_of })
                        .into());
                }
                None => return self.fallback.evaluate(instance, location, ctx),
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
    let Some(multiple_of) = schema.as_f64().filter(|value| *value > 0.) else {
        return Some(Err(ctx.invalid("multipleOf", "expected a number greater than 0")));
    };
    let fallback = MultipleOfFloatValidator { multiple_of };
    match schema.as_u64() {
        Some(integer) => Some(Ok(Box::new(MultipleOfIntegerValidator {
            multiple_of: integer,
            fallback,
        }))),
        None => Some(Ok(Box::new(fallback))),
    }
}
