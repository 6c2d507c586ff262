pub(crate) mod additional_items;
pub(crate) mod additional_properties;
pub(crate) mod all_of;
pub(crate) mod any_of;
pub(crate) mod const_;
pub(crate) mod contains;
pub(crate) mod dependencies;
pub(crate) mod enum_;
pub(crate) mod exclusive_maximum;
pub(crate) mod exclusive_minimum;
pub(crate) mod format;
pub(crate) mod helpers;
pub(crate) mod if_;
pub(crate) mod items;
pub(crate) mod max_items;
pub(crate) mod max_length;
pub(crate) mod max_properties;
pub(crate) mod maximum;
pub(crate) mod min_items;
pub(crate) mod min_length;
pub(crate) mod min_properties;
pub(crate) mod minimum;
pub(crate) mod multiple_of;
pub(crate) mod not;
pub(crate) mod one_of;
pub(crate) mod pattern;
pub(crate) mod pattern_properties;
pub(crate) mod prefix_items;
pub(crate) mod properties;
pub(crate) mod property_names;
pub(crate) mod ref_;
pub(crate) mod required;
pub(crate) mod type_;
pub(crate) mod unique_items;

use serde_json::{Map, Value};

use crate::{compiler, draft::Draft, error::SchemaError, validator::Validate};

pub(crate) type CompilationResult = Result<BoxedValidator, SchemaError>;
pub(crate) type BoxedValidator = Box<dyn Validate + Send + Sync>;

pub(crate) type CompileFunc =
    fn(&mut compiler::Context<'_>, &Map<String, Value>, &Value) -> Option<CompilationResult>;

/// Validation keywords with a compiled evaluator.
///
/// References, anchors, definitions and the conditional group are stored on the schema body
/// directly and have no entry here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum KeywordKind {
    AdditionalItems,
    AdditionalProperties,
    AllOf,
    AnyOf,
    Const,
    Contains,
    Dependencies,
    DependentRequired,
    DependentSchemas,
    Enum,
    ExclusiveMaximum,
    ExclusiveMinimum,
    Format,
    Items,
    MaxItems,
    MaxLength,
    MaxProperties,
    Maximum,
    MinItems,
    MinLength,
    MinProperties,
    Minimum,
    MultipleOf,
    Not,
    OneOf,
    Pattern,
    PatternProperties,
    PrefixItems,
    Properties,
    PropertyNames,
    Required,
    Type,
    UniqueItems,
}

impl KeywordKind {
    pub(crate) fn from_name(name: &str) -> Option<KeywordKind> {
        Some(match name {
            "additionalItems" => KeywordKind::AdditionalItems,
            "additionalProperties" => KeywordKind::AdditionalProperties,
            "allOf" => KeywordKind::AllOf,
            "anyOf" => KeywordKind::AnyOf,
            "const" => KeywordKind::Const,
            "contains" => KeywordKind::Contains,
            "dependencies" => KeywordKind::Dependencies,
            "dependentRequired" => KeywordKind::DependentRequired,
            "dependentSchemas" => KeywordKind::DependentSchemas,
            "enum" => KeywordKind::Enum,
            "exclusiveMaximum" => KeywordKind::ExclusiveMaximum,
            "exclusiveMinimum" => KeywordKind::ExclusiveMinimum,
            "format" => KeywordKind::Format,
            "items" => KeywordKind::Items,
            "maxItems" => KeywordKind::MaxItems,
            "maxLength" => KeywordKind::MaxLength,
            "maxProperties" => KeywordKind::MaxProperties,
            "maximum" => KeywordKind::Maximum,
            "minItems" => KeywordKind::MinItems,
            "minLength" => KeywordKind::MinLength,
            "minProperties" => KeywordKind::MinProperties,
            "minimum" => KeywordKind::Minimum,
            "multipleOf" => KeywordKind::MultipleOf,
            "not" => KeywordKind::Not,
            "oneOf" => KeywordKind::OneOf,
            "pattern" => KeywordKind::Pattern,
            "patternProperties" => KeywordKind::PatternProperties,
            "prefixItems" => KeywordKind::PrefixItems,
            "properties" => KeywordKind::Properties,
            "propertyNames" => KeywordKind::PropertyNames,
            "required" => KeywordKind::Required,
            "type" => KeywordKind::Type,
            "uniqueItems" => KeywordKind::UniqueItems,
            _ => return None,
        })
    }

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            KeywordKind::AdditionalItems => "additionalItems",
            KeywordKind::AdditionalProperties => "additionalProperties",
            KeywordKind::AllOf => "allOf",
            KeywordKind::AnyOf => "anyOf",
            KeywordKind::Const => "const",
            KeywordKind::Contains => "contains",
            KeywordKind::Dependencies => "dependencies",
            KeywordKind::DependentRequired => "dependentRequired",
            KeywordKind::DependentSchemas => "dependentSchemas",
            KeywordKind::Enum => "enum",
            KeywordKind::ExclusiveMaximum => "exclusiveMaximum",
            KeywordKind::ExclusiveMinimum => "exclusiveMinimum",
            KeywordKind::Format => "format",
            KeywordKind::Items => "items",
            KeywordKind::MaxItems => "maxItems",
            KeywordKind::MaxLength => "maxLength",
            KeywordKind::MaxProperties => "maxProperties",
            KeywordKind::Maximum => "maximum",
            KeywordKind::MinItems => "minItems",
            KeywordKind::MinLength => "minLength",
            KeywordKind::MinProperties => "minProperties",
            KeywordKind::Minimum => "minimum",
            KeywordKind::MultipleOf => "multipleOf",
            KeywordKind::Not => "not",
            KeywordKind::OneOf => "oneOf",
            KeywordKind::Pattern => "pattern",
            KeywordKind::PatternProperties => "patternProperties",
            KeywordKind::PrefixItems => "prefixItems",
            KeywordKind::Properties => "properties",
            KeywordKind::PropertyNames => "propertyNames",
            KeywordKind::Required => "required",
            KeywordKind::Type => "type",
            KeywordKind::UniqueItems => "uniqueItems",
        }
    }
}

pub(crate) fn get_for_draft(draft: Draft, kind: KeywordKind) -> Option<CompileFunc> {
    match (draft, kind) {
        // Keywords common to all drafts
        (_, KeywordKind::AdditionalProperties) => Some(additional_properties::compile),
        (_, KeywordKind::AllOf) => Some(all_of::compile),
        (_, KeywordKind::AnyOf) => Some(any_of::compile),
        (_, KeywordKind::Const) => Some(const_::compile),
        (_, KeywordKind::Contains) => Some(contains::compile),
        (_, KeywordKind::Enum) => Some(enum_::compile),
        (_, KeywordKind::ExclusiveMaximum) => Some(exclusive_maximum::compile),
        (_, KeywordKind::ExclusiveMinimum) => Some(exclusive_minimum::compile),
        (_, KeywordKind::Format) => Some(format::compile),
        (_, KeywordKind::Items) => Some(items::compile),
        (_, KeywordKind::MaxItems) => Some(max_items::compile),
        (_, KeywordKind::MaxLength) => Some(max_length::compile),
        (_, KeywordKind::MaxProperties) => Some(max_properties::compile),
        (_, KeywordKind::Maximum) => Some(maximum::compile),
        (_, KeywordKind::MinItems) => Some(min_items::compile),
        (_, KeywordKind::MinLength) => Some(min_length::compile),
        (_, KeywordKind::MinProperties) => Some(min_properties::compile),
        (_, KeywordKind::Minimum) => Some(minimum::compile),
        (_, KeywordKind::MultipleOf) => Some(multiple_of::compile),
        (_, KeywordKind::Not) => Some(not::compile),
        (_, KeywordKind::OneOf) => Some(one_of::compile),
        (_, KeywordKind::Pattern) => Some(pattern::compile),
        (_, KeywordKind::PatternProperties) => Some(pattern_properties::compile),
        (_, KeywordKind::Properties) => Some(properties::compile),
        (_, KeywordKind::PropertyNames) => Some(property_names::compile),
        (_, KeywordKind::Required) => Some(required::compile),
        (_, KeywordKind::Type) => Some(type_::compile),
        (_, KeywordKind::UniqueItems) => Some(unique_items::compile),

        // Draft 7 specific
        (Draft::Draft7, KeywordKind::Dependencies) => Some(dependencies::compile),

        // Draft 7 and 2019-09
        (Draft::Draft7 | Draft::Draft201909, KeywordKind::AdditionalItems) => {
            Some(additional_items::compile)
        }

        // Draft 2019-09 and 2020-12
        (Draft::Draft201909 | Draft::Draft202012, KeywordKind::DependentRequired) => {
            Some(dependencies::compile_dependent_required)
        }
        (Draft::Draft201909 | Draft::Draft202012, KeywordKind::DependentSchemas) => {
            Some(dependencies::compile_dependent_schemas)
        }

        // Draft 2020-12 specific
        (Draft::Draft202012, KeywordKind::PrefixItems) => Some(prefix_items::compile),

        _ => None,
    }
}

/// What a keyword tells its siblings in the same schema object.
///
/// Filled from every compiled keyword once the whole object is compiled, then handed back to
/// each keyword so that `additionalProperties` and `additionalItems` can find what the other
/// keywords already cover.
#[derive(Debug, Default)]
pub(crate) struct Siblings {
    pub(crate) properties: Vec<String>,
    pub(crate) patterns: Vec<String>,
    /// Number of positions covered by `prefixItems` or by array-form `items`.
    pub(crate) prefix_items: usize,
    /// Whether `items` is present in array form.
    pub(crate) items_tuple: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("minLength")]
    #[test_case("additionalProperties")]
    #[test_case("prefixItems")]
    #[test_case("uniqueItems")]
    fn names_round_trip(name: &str) {
        let kind = KeywordKind::from_name(name).expect("Known keyword");
        assert_eq!(kind.as_str(), name);
    }

    #[test_case(Draft::Draft7, KeywordKind::PrefixItems, false)]
    #[test_case(Draft::Draft202012, KeywordKind::PrefixItems, true)]
    #[test_case(Draft::Draft7, KeywordKind::Dependencies, true)]
    #[test_case(Draft::Draft201909, KeywordKind::Dependencies, false)]
    #[test_case(Draft::Draft202012, KeywordKind::AdditionalItems, false)]
    #[test_case(Draft::Draft201909, KeywordKind::DependentRequired, true)]
    fn availability(draft: Draft, kind: KeywordKind, available: bool) {
        assert_eq!(get_for_draft(draft, kind).is_some(), available);
    }
}
