use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::CompilationResult,
    node::{NodeId, Subschemas},
    output::{Evaluation, EvaluationResult, OutputMode},
    paths::LazyLocation,
    validator::Validate,
};

pub(crate) struct OneOfValidator {
    schemas: Vec<NodeId>,
}

impl Validate for OneOfValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        let mut first_valid = None;
        for (idx, node) in self.schemas.iter().enumerate() {
            let evaluation = ctx.in_segment(idx, |ctx| ctx.evaluate(*node, instance, location))?;
            if evaluation.is_valid() {
                if first_valid.is_some() {
                    // A second match settles the outcome
                    return Ok(ctx
                        .error(instance, location, ValidationErrorKind::OneOfMultipleValid)
                        .into());
                }
                first_valid = Some(idx);
            } else if first_valid.is_none() {
                collector.push(evaluation);
            }
        }
        if first_valid.is_some() {
            return Ok(Evaluation::Valid);
        }
        let error = ctx.error(instance, location, ValidationErrorKind::OneOfNotValid);
        if collector.is_empty() || ctx.mode() == OutputMode::FailFast {
            return Ok(error.into());
        }
        collector.push_error(error);
        Ok(collector.finish())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::List(&self.schemas)
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(
        ctx.compile_non_empty_list("oneOf", schema)
            .map(|schemas| Box::new(OneOfValidator { schemas }) as _),
    )
}

#[cfg(test)]
mod tests {
    use crate::{error::ValidationErrorKind, tests_util, OutputMode};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"oneOf": [{"multipleOf": 2}, {"multipleOf": 3}]}), &json!(4))]
    #[test_case(&json!({"oneOf": [{"multipleOf": 2}, {"multipleOf": 3}]}), &json!(9))]
    #[test_case(&json!({"oneOf": [false, true, false]}), &json!(null))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"oneOf": [{"multipleOf": 2}, {"multipleOf": 3}]}), &json!(6))]
    #[test_case(&json!({"oneOf": [{"multipleOf": 2}, {"multipleOf": 3}]}), &json!(5))]
    #[test_case(&json!({"oneOf": [true, true]}), &json!(null))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!(6), OutputMode::FailFast, &[ValidationErrorKind::OneOfMultipleValid])]
    #[test_case(&json!(6), OutputMode::List, &[ValidationErrorKind::OneOfMultipleValid])]
    #[test_case(&json!(5), OutputMode::FailFast, &[ValidationErrorKind::OneOfNotValid])]
    #[test_case(
        &json!(5),
        OutputMode::List,
        &[
            ValidationErrorKind::MultipleOf { multiple_of: 2.0 },
            ValidationErrorKind::MultipleOf { multiple_of: 3.0 },
            ValidationErrorKind::OneOfNotValid,
        ]
    )]
    fn error_kinds(instance: &Value, mode: OutputMode, expected: &[ValidationErrorKind]) {
        let errors = tests_util::errors(
            &json!({"oneOf": [{"multipleOf": 2}, {"multipleOf": 3}]}),
            instance,
            mode,
        );
        let kinds: Vec<_> = errors.into_iter().map(|error| error.kind).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn messages() {
        tests_util::expect_errors(
            &json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]}),
            &json!(1),
            &["1 is valid under more than one of the schemas listed in the 'oneOf' keyword"],
        );
    }
}
