//! `dependencies` from Draft 7 and its two successors, `dependentRequired` and
//! `dependentSchemas`.
use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    keywords::{helpers::string_array, required::RequiredValidator, CompilationResult},
    node::{NodeId, Subschemas},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

enum Dependency {
    Required(RequiredValidator),
    Schema(NodeId),
}

pub(crate) struct DependenciesValidator {
    dependencies: Vec<(String, Dependency)>,
    // Schema-valued entries only, for reference lookups
    schemas: Vec<(String, NodeId)>,
}

impl Validate for DependenciesValidator {
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
        for (property, dependency) in &self.dependencies {
            if !item.contains_key(property) {
                continue;
            }
            let evaluation = ctx.in_segment(property, |ctx| match dependency {
                Dependency::Required(required) => {
                    Ok(required.check(item, instance, location, ctx))
                }
                Dependency::Schema(node) => ctx.evaluate(*node, instance, location),
            })?;
            if collector.push(evaluation) {
                break;
            }
        }
        Ok(collector.finish())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::Map(&self.schemas)
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let Value::Object(map) = schema else {
        return Some(Err(ctx.invalid("dependencies", "expected an object")));
    };
    let base = ctx.location().join("dependencies");
    let mut dependencies = Vec::with_capacity(map.len());
    let mut schemas = Vec::new();
    for (property, value) in map {
        let dependency = match value {
            Value::Array(_) => match string_array(ctx, "dependencies", value) {
                Ok(required) => Dependency::Required(RequiredValidator::new(required)),
                Err(error) => return Some(Err(error)),
            },
            _ => match ctx.compile_at(base.join(property), value) {
                Ok(node) => {
                    schemas.push((property.clone(), node));
                    Dependency::Schema(node)
                }
                Err(error) => return Some(Err(error)),
            },
        };
        dependencies.push((property.clone(), dependency));
    }
    Some(Ok(Box::new(DependenciesValidator {
        dependencies,
        schemas,
    })))
}

pub(crate) struct DependentRequiredValidator {
    dependencies: Vec<(String, RequiredValidator)>,
}

impl Validate for DependentRequiredValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        if let Value::Object(item) = instance {
            for (property, required) in &self.dependencies {
                if item.contains_key(property) {
                    let evaluation = ctx.in_segment(property, |ctx| {
                        required.check(item, instance, location, ctx)
                    });
                    if collector.push(evaluation) {
                        break;
                    }
                }
            }
        }
        Ok(collector.finish())
    }
}

#[inline]
pub(crate) fn compile_dependent_required(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    let Value::Object(map) = schema else {
        return Some(Err(ctx.invalid("dependentRequired", "expected an object")));
    };
    let mut dependencies = Vec::with_capacity(map.len());
    for (property, value) in map {
        match string_array(ctx, "dependentRequired", value) {
            Ok(required) => dependencies.push((property.clone(), RequiredValidator::new(required))),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(DependentRequiredValidator { dependencies })))
}

pub(crate) struct DependentSchemasValidator {
    schemas: Vec<(String, NodeId)>,
}

impl Validate for DependentSchemasValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        let mut collector = ctx.collector();
        let Value::Object(item) = instance else {
            return Ok(Evaluation::Valid);
        };
        for (property, node) in &self.schemas {
            if item.contains_key(property) {
                let evaluation =
                    ctx.in_segment(property, |ctx| ctx.evaluate(*node, instance, location))?;
                if collector.push(evaluation) {
                    break;
                }
            }
        }
        Ok(collector.finish())
    }

    fn subschemas(&self) -> Subschemas<'_> {
        Subschemas::Map(&self.schemas)
    }
}

#[inline]
pub(crate) fn compile_dependent_schemas(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    Some(
        ctx.compile_map("dependentSchemas", schema)
            .map(|schemas| Box::new(DependentSchemasValidator { schemas }) as _),
    )
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn legacy() -> Value {
        json!({
            "dependencies": {
                "bar": ["foo"],
                "baz": {"required": ["qux"], "properties": {"baz": {"type": "integer"}}}
            }
        })
    }

    #[test_case(&json!({}))]
    #[test_case(&json!({"foo": 1}))]
    #[test_case(&json!({"foo": 1, "bar": 2}))]
    #[test_case(&json!({"baz": 1, "qux": 2}))]
    #[test_case(&json!(["bar"]); "ignores non-objects")]
    fn dependencies_valid(instance: &Value) {
        tests_util::is_valid_with_draft(Draft::Draft7, &legacy(), instance);
    }

    #[test_case(&json!({"bar": 2}))]
    #[test_case(&json!({"baz": 1}))]
    #[test_case(&json!({"baz": "1", "qux": 2}))]
    fn dependencies_invalid(instance: &Value) {
        tests_util::is_not_valid_with_draft(Draft::Draft7, &legacy(), instance);
    }

    #[test]
    fn dependencies_ignored_in_2020() {
        tests_util::is_valid(&legacy(), &json!({"bar": 2}));
    }

    #[test_case(&json!({"dependentRequired": {"a": ["b", "c"]}}), &json!({"a": 1, "b": 2, "c": 3}))]
    #[test_case(&json!({"dependentRequired": {"a": ["b"]}}), &json!({"b": 2}))]
    #[test_case(&json!({"dependentSchemas": {"a": {"minProperties": 2}}}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!({"dependentSchemas": {"a": false}}), &json!({"b": 1}))]
    fn is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"dependentRequired": {"a": ["b", "c"]}}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!({"dependentSchemas": {"a": {"minProperties": 2}}}), &json!({"a": 1}))]
    #[test_case(&json!({"dependentSchemas": {"a": false}}), &json!({"a": 1}))]
    fn is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance);
    }

    #[test]
    fn messages() {
        tests_util::expect_errors(
            &json!({"dependentRequired": {"a": ["b", "c"]}}),
            &json!({"a": 1}),
            &[r#""b" is a required property"#, r#""c" is a required property"#],
        );
    }

    #[test]
    fn schema_location() {
        tests_util::assert_schema_location(
            &json!({"dependentSchemas": {"a": {"minProperties": 2}}}),
            &json!({"a": 1}),
            "/dependentSchemas/a/minProperties",
        );
        tests_util::assert_schema_location(
            &json!({"dependentRequired": {"a": ["b"]}}),
            &json!({"a": 1}),
            "/dependentRequired/a",
        );
    }
}
