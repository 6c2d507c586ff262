use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::{SchemaError, ValidationErrorKind},
    keywords::CompilationResult,
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    pattern_cache::MatchError,
    validator::Validate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternMatch {
    Matched,
    NotMatched,
    TimedOut,
}

/// Match `text` through the shared pattern cache.
///
/// A timeout is an answer of its own, engine failures are faults.
pub(crate) fn match_pattern(
    ctx: &ValidationContext<'_>,
    pattern: &str,
    text: &str,
) -> Result<PatternMatch, SchemaError> {
    match ctx.is_match(pattern, text) {
        Ok(true) => Ok(PatternMatch::Matched),
        Ok(false) => Ok(PatternMatch::NotMatched),
        Err(MatchError::Timeout) => {
            tracing::debug!(pattern, "Pattern match timed out");
            Ok(PatternMatch::TimedOut)
        }
        Err(MatchError::Engine(message)) => Err(SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            message,
        }),
    }
}

pub(crate) struct PatternValidator {
    pattern: String,
}

impl Validate for PatternValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let Value::String(item) = instance else {
            return Ok(Evaluation::Valid);
        };
        let kind = match match_pattern(ctx, &self.pattern, item)? {
            PatternMatch::Matched => return Ok(Evaluation::Valid),
            PatternMatch::NotMatched => ValidationErrorKind::Pattern {
                pattern: self.pattern.clone(),
            },
            PatternMatch::TimedOut => ValidationErrorKind::PatternTimeout {
                pattern: self.pattern.clone(),
            },
        };
        Ok(ctx.error(instance, location, kind).into())
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let Some(pattern) = schema.as_str() else {
        return Some(Err(ctx.invalid("pattern", "expected a string")));
    };
    Some(ctx.matcher(pattern).map(|_| {
        Box::new(PatternValidator {
            pattern: pattern.to_string(),
        }) as _
    }))
}
