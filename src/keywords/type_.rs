use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::{SchemaError, TypeKind, ValidationErrorKind},
    keywords::CompilationResult,
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    primitive_type::{PrimitiveType, PrimitiveTypes},
    validator::Validate,
};

pub(crate) struct SingleTypeValidator {
    type_: PrimitiveType,
}

impl Validate for SingleTypeValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if self.type_.matches(instance) {
            return Ok(Evaluation::Valid);
        }
        Ok(ctx
            .error(
                instance,
                location,
                ValidationErrorKind::Type {
                    kind: TypeKind::Single(self.type_),
                },
            )
            .into())
    }
}

pub(crate) struct MultipleTypesValidator {
    types: PrimitiveTypes,
}

impl Validate for MultipleTypesValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if self.types.matches(instance) {
            return Ok(Evaluation::Valid);
        }
        Ok(ctx
            .error(
                instance,
                location,
                ValidationErrorKind::Type {
                    kind: TypeKind::Multiple(self.types),
                },
            )
            .into())
    }
}

fn parse_type(ctx: &compiler::Context<'_>, item: &Value) -> Result<PrimitiveType, SchemaError> {
    item.as_str()
        .and_then(PrimitiveType::from_name)
        .ok_or_else(|| ctx.invalid("type", format!("{item} is not a known type")))
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    match schema {
        Value::String(_) => Some(
            parse_type(ctx, schema).map(|type_| Box::new(SingleTypeValidator { type_ }) as _),
        ),
        Value::Array(items) => {
            let mut types = PrimitiveTypes::new();
            for item in items {
                match parse_type(ctx, item) {
                    Ok(type_) => types |= type_,
                    Err(error) => return Some(Err(error)),
                }
            }
            Some(Ok(Box::new(MultipleTypesValidator { types })))
        }
        _ => Some(Err(ctx.invalid("type", "expected a string or an array of strings"))),
    }
}
