//! # Description
//! `additionalProperties` applies to the members not covered by the sibling `properties` and
//! `patternProperties` keywords of the same schema object.
//!
//! A name whose pattern match times out counts as covered. `patternProperties` already reports
//! the timeout.
use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::{SchemaError, ValidationErrorKind},
    keywords::{
        pattern::{match_pattern, PatternMatch},
        CompilationResult, Siblings,
    },
    node::{NodeId, SchemaNode, Subschemas},
    output::EvaluationResult,
    paths::LazyLocation,
    validator::Validate,
};

pub(crate) struct AdditionalPropertiesValidator {
    node: NodeId,
    properties: Vec<String>,
    patterns: Vec<String>,
}

impl AdditionalPropertiesValidator {
    fn is_covered(&self, name: &str, ctx: &ValidationContext<'_>) -> Result<bool, SchemaError> {
        if self.properties.iter().any(|property| property == name) {
            return Ok(true);
        }
        for pattern in &self.patterns {
            if match_pattern(ctx, pattern, name)? != PatternMatch::NotMatched {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Validate for AdditionalPropertiesValidator {
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
        if matches!(ctx.arena().get(self.node), SchemaNode::Boolean(false)) {
            let mut unexpected = Vec::new();
            for name in item.keys() {
                if !self.is_covered(name, ctx)? {
                    unexpected.push(name.clone());
                }
            }
            if !unexpected.is_empty() {
                collector.push_error(ctx.error(
                    instance,
                    location,
                    ValidationErrorKind::AdditionalProperties { unexpected },
                ));
            }
            return Ok(collector.finish());
        }
        for (name, value) in item {
            if self.is_covered(name, ctx)? {
                continue;
            }
            if collector.push(ctx.evaluate(self.node, value, &location.push(name))?) {
                break;
            }
        }
        Ok(collector.finish())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::Single(self.node)
    }

    fn link(&mut self, siblings: &Siblings) {
        self.properties.clone_from(&siblings.properties);
        self.patterns.clone_from(&siblings.patterns);
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(ctx.compile_subschema("additionalProperties", schema).map(|node| {
        Box::new(AdditionalPropertiesValidator {
            node,
            properties: Vec::new(),
            patterns: Vec::new(),
        }) as _
    }))
}
