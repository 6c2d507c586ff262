use serde_json::{Map, Value};

use crate::error::SchemaError;

/// JSON Schema dialects understood by this crate.
#[non_exhaustive]
#[derive(Debug, Default, PartialEq, Copy, Clone, Hash, Eq, PartialOrd, Ord)]
pub enum Draft {
    /// JSON Schema Draft 7
    Draft7,
    /// JSON Schema Draft 2019-09
    Draft201909,
    /// JSON Schema Draft 2020-12
    #[default]
    Draft202012,
}

/// What a `$id` value declares.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Identifier<'a> {
    /// A new schema resource with the given raw URI reference.
    Resource(&'a str),
    /// A draft-7 style plain-name fragment (`"$id": "#foo"`).
    Anchor(&'a str),
}

impl Draft {
    /// Detect the dialect declared by `$schema`, falling back to `self`.
    ///
    /// # Errors
    ///
    /// On unknown `$schema` value it returns [`SchemaError::UnknownDialect`].
    pub fn detect(self, contents: &Map<String, Value>) -> Result<Draft, SchemaError> {
        match contents.get("$schema").and_then(Value::as_str) {
            Some(uri) => Self::from_uri(uri).ok_or_else(|| SchemaError::UnknownDialect {
                uri: uri.to_string(),
            }),
            None => Ok(self),
        }
    }

    fn from_uri(uri: &str) -> Option<Draft> {
        let uri = uri.trim_end_matches('#');
        let uri = uri
            .strip_prefix("https://")
            .or_else(|| uri.strip_prefix("http://"))?;
        match uri {
            "json-schema.org/draft/2020-12/schema" => Some(Draft::Draft202012),
            "json-schema.org/draft/2019-09/schema" => Some(Draft::Draft201909),
            "json-schema.org/draft-07/schema" => Some(Draft::Draft7),
            _ => None,
        }
    }

    pub(crate) fn identifier_of(self, contents: &Map<String, Value>) -> Option<Identifier<'_>> {
        let id = contents.get("$id")?.as_str()?;
        match self {
            Draft::Draft7 => {
                // `$id` is ignored next to `$ref` in draft 7
                if contents.contains_key("$ref") {
                    None
                } else if let Some(anchor) = id.strip_prefix('#') {
                    if anchor.is_empty() {
                        None
                    } else {
                        Some(Identifier::Anchor(anchor))
                    }
                } else {
                    Some(Identifier::Resource(id))
                }
            }
            Draft::Draft201909 | Draft::Draft202012 => {
                if id.starts_with('#') {
                    None
                } else {
                    Some(Identifier::Resource(id))
                }
            }
        }
    }

    /// Whether `$ref` replaces every sibling keyword.
    pub(crate) const fn ref_overrides_siblings(self) -> bool {
        matches!(self, Draft::Draft7)
    }

    /// Identifies known JSON schema keywords per draft.
    ///
    /// Object values under unknown keywords are still walked so references into them resolve.
    #[must_use]
    pub fn is_known_keyword(self, keyword: &str) -> bool {
        match keyword {
            "$ref" | "$schema" | "$id" | "$comment" | "additionalItems"
            | "additionalProperties" | "allOf" | "anyOf" | "const" | "contains" | "default"
            | "definitions" | "description" | "else" | "enum" | "examples" | "exclusiveMaximum"
            | "exclusiveMinimum" | "format" | "if" | "items" | "maxItems" | "maxLength"
            | "maxProperties" | "maximum" | "minItems" | "minLength" | "minProperties"
            | "minimum" | "multipleOf" | "not" | "oneOf" | "pattern" | "patternProperties"
            | "properties" | "propertyNames" | "readOnly" | "required" | "then" | "title"
            | "type" | "uniqueItems" | "writeOnly" | "contentEncoding" | "contentMediaType" => {
                true
            }
            "dependencies" => self == Draft::Draft7,
            "$anchor" | "$defs" | "$vocabulary" | "dependentRequired" | "dependentSchemas"
            | "maxContains" | "minContains" | "unevaluatedItems" | "unevaluatedProperties"
            | "contentSchema" | "deprecated" => self >= Draft::Draft201909,
            "$recursiveAnchor" | "$recursiveRef" => self == Draft::Draft201909,
            "$dynamicAnchor" | "$dynamicRef" | "prefixItems" => self == Draft::Draft202012,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("Object")
    }

    #[test_case(json!({"$schema": "https://json-schema.org/draft/2020-12/schema"}), Draft::Draft202012)]
    #[test_case(json!({"$schema": "https://json-schema.org/draft/2019-09/schema#"}), Draft::Draft201909)]
    #[test_case(json!({"$schema": "http://json-schema.org/draft-07/schema#"}), Draft::Draft7)]
    #[test_case(json!({"$schema": "https://json-schema.org/draft-07/schema"}), Draft::Draft7)]
    #[test_case(json!({}), Draft::Draft202012)]
    fn detection(schema: Value, expected: Draft) {
        assert_eq!(Draft::default().detect(&object(schema)).expect("Known"), expected);
    }

    #[test]
    fn unknown_dialect() {
        let schema = object(json!({"$schema": "http://json-schema.org/draft-04/schema#"}));
        assert!(matches!(
            Draft::default().detect(&schema),
            Err(SchemaError::UnknownDialect { .. })
        ));
    }

    #[test_case(Draft::Draft7, json!({"$id": "#foo"}), Some(Identifier::Anchor("foo")))]
    #[test_case(Draft::Draft7, json!({"$id": "a.json", "$ref": "#"}), None)]
    #[test_case(Draft::Draft7, json!({"$id": "a.json"}), Some(Identifier::Resource("a.json")))]
    #[test_case(Draft::Draft202012, json!({"$id": "#foo"}), None)]
    #[test_case(Draft::Draft202012, json!({"$id": "a.json", "$ref": "#"}), Some(Identifier::Resource("a.json")))]
    fn identifiers(draft: Draft, schema: Value, expected: Option<Identifier<'static>>) {
        let schema = object(schema);
        assert_eq!(draft.identifier_of(&schema), expected);
    }

    #[test_case(Draft::Draft7, "prefixItems", false)]
    #[test_case(Draft::Draft202012, "prefixItems", true)]
    #[test_case(Draft::Draft201909, "$recursiveRef", true)]
    #[test_case(Draft::Draft202012, "$recursiveRef", false)]
    #[test_case(Draft::Draft7, "dependencies", true)]
    #[test_case(Draft::Draft202012, "x-custom", false)]
    fn known_keywords(draft: Draft, keyword: &str, expected: bool) {
        assert_eq!(draft.is_known_keyword(keyword), expected);
    }
}
