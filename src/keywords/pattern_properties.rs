use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::{
        pattern::{match_pattern, PatternMatch},
        CompilationResult, Siblings,
    },
    node::{NodeId, Subschemas},
    output::EvaluationResult,
    paths::LazyLocation,
    validator::Validate,
};

/// Every property whose name matches a pattern is checked against that pattern's schema.
///
/// A name may match several patterns. A timed out match is reported against the object and the
/// remaining patterns are still tried.
pub(crate) struct PatternPropertiesValidator {
    patterns: Vec<(String, NodeId)>,
}

impl Validate for PatternPropertiesValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        let Value::Object(item) = instance else {
            return Ok(collector.finish());
        };
        for (pattern, node) in &self.patterns {
            for (name, value) in item {
                let evaluation = match match_pattern(ctx, pattern, name)? {
                    PatternMatch::NotMatched => continue,
                    PatternMatch::Matched => ctx.in_segment(pattern, |ctx| {
                        ctx.evaluate(*node, value, &location.push(name))
                    })?,
                    PatternMatch::TimedOut => ctx
                        .error(
                            instance,
                            location,
                            ValidationErrorKind::PatternTimeout {
                                pattern: pattern.clone(),
                            },
                        )
                        .into(),
                };
                if collector.push(evaluation) {
                    return Ok(collector.finish());
                }
            }
        }
        Ok(collector.finish())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::Map(&self.patterns)
    }

    fn collect_siblings(&self, siblings: &mut Siblings) {
        siblings
            .patterns
            .extend(self.patterns.iter().map(|(pattern, _)| pattern.clone()));
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let patterns = match ctx.compile_map("patternProperties", schema) {
        Ok(patterns) => patterns,
        Err(error) => return Some(Err(error)),
    };
    for (pattern, _) in &patterns {
        if let Err(error) = ctx.matcher(pattern) {
            return Some(Err(error));
        }
    }
    Some(Ok(Box::new(PatternPropertiesValidator { patterns })))
}
