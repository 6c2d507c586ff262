use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    draft::Draft,
    error::ValidationErrorKind,
    keywords::{helpers::non_negative_integer, CompilationResult},
    node::{NodeId, Subschemas},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

/// `contains` together with the `minContains` and `maxContains` bounds of the same object.
///
/// Items are only probed, so errors of non-matching items never show up in the output.
pub(crate) struct ContainsValidator {
    node: NodeId,
    min_contains: Option<u64>,
    max_contains: Option<u64>,
}

impl Validate for ContainsValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let Value::Array(items) = instance else {
            return Ok(Evaluation::Valid);
        };
        let min = self.min_contains.unwrap_or(1);
        if min == 0 && self.max_contains.is_none() {
            return Ok(Evaluation::Valid);
        }
        let mut matched = 0_u64;
        for (idx, item) in items.iter().enumerate() {
            if ctx.probe(self.node, item, &location.push(idx))? {
                matched += 1;
                // Nothing left to learn once both bounds are settled
                if self.max_contains.is_none() && matched >= min {
                    return Ok(Evaluation::Valid);
                }
            }
        }
        let kind = if matched < min {
            if self.min_contains.is_none() {
                ValidationErrorKind::Contains
            } else {
                ValidationErrorKind::MinContains {
                    limit: min,
                    matched,
                }
            }
        } else {
            match self.max_contains {
                Some(limit) if matched > limit => {
                    ValidationErrorKind::MaxContains { limit, matched }
                }
                _ => return Ok(Evaluation::Valid),
            }
        };
        Ok(ctx.error(instance, location, kind).into())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::Single(self.node)
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let node = match ctx.compile_subschema("contains", schema) {
        Ok(node) => node,
        Err(error) => return Some(Err(error)),
    };
    let bound = |keyword: &'static str| {
        if ctx.draft() == Draft::Draft7 {
            return Ok(None);
        }
        parent
            .get(keyword)
            .map(|value| non_negative_integer(ctx, keyword, value))
            .transpose()
    };
    let (min_contains, max_contains) = match (bound("minContains"), bound("maxContains")) {
        (Ok(min), Ok(max)) => (min, max),
        (Err(error), _) | (_, Err(error)) => return Some(Err(error)),
    };
    Some(Ok(Box::new(ContainsValidator {
        node,
        min_contains,
        max_contains,
    })))
}
