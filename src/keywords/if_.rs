use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::SchemaError,
    node::NodeId,
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
};

/// The `if`/`then`/`else` group of one schema object.
///
/// `then` and `else` without `if` are kept so references can still point into them, but they
/// never apply.
#[derive(Debug)]
pub(crate) struct Conditional {
    predicate: Option<NodeId>,
    then: Option<NodeId>,
    otherwise: Option<NodeId>,
}

impl Conditional {
    pub(crate) fn compile(
        ctx: &mut compiler::Context<'_>,
        schema: &Map<String, Value>,
    ) -> Result<Option<Conditional>, SchemaError> {
        let mut compile = |keyword: &str| {
            schema
                .get(keyword)
                .map(|value| ctx.compile_subschema(keyword, value))
                .transpose()
        };
        let predicate = compile("if")?;
        let then = compile("then")?;
        let otherwise = compile("else")?;
        if predicate.is_none() && then.is_none() && otherwise.is_none() {
            return Ok(None);
        }
        Ok(Some(Conditional {
            predicate,
            then,
            otherwise,
        }))
    }

    pub(crate) fn branch(&self, name: &str) -> Option<NodeId> {
        match name {
            "if" => self.predicate,
            "then" => self.then,
            "else" => self.otherwise,
            _ => None,
        }
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = NodeId> {
        [self.predicate, self.then, self.otherwise].into_iter().flatten()
    }

    /// The predicate only selects a branch, its own failures are never reported.
    pub(crate) fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let Some(predicate) = self.predicate else {
            return Ok(Evaluation::Valid);
        };
        let matched = ctx.in_keyword("if", |ctx| ctx.probe(predicate, instance, location))?;
        let (keyword, branch) = if matched {
            ("then", self.then)
        } else {
            ("else", self.otherwise)
        };
        match branch {
            Some(branch) => {
                ctx.in_keyword(keyword, |ctx| ctx.evaluate(branch, instance, location))
            }
            None => Ok(Evaluation::Valid),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 10}}), &json!(15))]
    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 10}}), &json!("short"))]
    #[test_case(&json!({"if": {"type": "integer"}, "else": {"minLength": 3}}), &json!(1))]
    #[test_case(&json!({"if": {"type": "integer"}, "else": {"minLength": 3}}), &json!("long"))]
    #[test_case(&json!({"then": false, "else": false}), &json!(1); "branches without if")]
    #[test_case(&json!({"if": false}), &json!(1); "predicate alone")]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"if": {"type": "integer"}, "then": {"minimum": 10}}), &json!(5))]
    #[test_case(&json!({"if": {"type": "integer"}, "else": {"minLength": 3}}), &json!("ab"))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}}), &json!(3), "/then/multipleOf")]
    #[test_case(&json!({"if": {"minimum": 0}, "else": {"multipleOf": 2}}), &json!(-3), "/else/multipleOf")]
    fn schema_location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }
}
