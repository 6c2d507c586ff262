//! Error types
use crate::{
    paths::Location,
    primitive_type::{PrimitiveType, PrimitiveTypes},
};
use serde_json::Value;
use std::{
    borrow::Cow,
    error,
    fmt::{self, Formatter},
    sync::Arc,
};

/// An instance failed one keyword of the schema.
///
/// Validation errors are values, never faults: they describe *where* and *why* the instance does
/// not conform, while [`SchemaError`] describes a schema that cannot be used at all.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError<'a> {
    /// Value of the property that failed validation.
    pub instance: Cow<'a, Value>,
    /// Type of validation error.
    pub kind: ValidationErrorKind,
    /// Name of the keyword that produced this error.
    pub keyword: &'static str,
    /// Path to the value that failed validation.
    pub instance_path: Location,
    /// Path of keywords and subschema names descended through from the validation root.
    pub schema_path: Location,
    /// Base URI of the schema resource owning the failing keyword.
    pub schema_base_uri: Option<Arc<str>>,
    /// Full reference URI through which the owning resource was entered, if any.
    pub referencing_uri: Option<Arc<str>>,
}

/// Kinds of errors that may happen during validation
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ValidationErrorKind {
    /// The input array contains more items than the tuple form of `items` allows.
    AdditionalItems { limit: usize },
    /// Unexpected properties.
    AdditionalProperties { unexpected: Vec<String> },
    /// The input value is not valid under any of the schemas listed in the 'anyOf' keyword.
    AnyOf,
    /// The input value doesn't match expected constant.
    Constant { expected_value: Value },
    /// The input array doesn't contain items conforming to the specified schema.
    Contains,
    /// Fewer array items than `minContains` matched the `contains` schema.
    MinContains { limit: u64, matched: u64 },
    /// More array items than `maxContains` matched the `contains` schema.
    MaxContains { limit: u64, matched: u64 },
    /// The input value doesn't match any of specified options.
    Enum { options: Value },
    /// Value is too large.
    ExclusiveMaximum { limit: Value },
    /// Value is too small.
    ExclusiveMinimum { limit: Value },
    /// Everything is invalid for `false` schema.
    FalseSchema,
    /// When the input doesn't match to the specified format.
    Format { format: String },
    /// Too many items in an array.
    MaxItems { limit: u64 },
    /// Value is too large.
    Maximum { limit: Value },
    /// String is too long.
    MaxLength { limit: u64, length: u64 },
    /// Too many properties in an object.
    MaxProperties { limit: u64 },
    /// Too few items in an array.
    MinItems { limit: u64 },
    /// Value is too small.
    Minimum { limit: Value },
    /// String is too short.
    MinLength { limit: u64, length: u64 },
    /// Not enough properties in an object.
    MinProperties { limit: u64 },
    /// When some number is not a multiple of another number.
    MultipleOf { multiple_of: f64 },
    /// Negated schema failed validation.
    Not { schema: Value },
    /// The given schema is valid under more than one of the schemas listed in the 'oneOf' keyword.
    OneOfMultipleValid,
    /// The given schema is not valid under any of the schemas listed in the 'oneOf' keyword.
    OneOfNotValid,
    /// When the input doesn't match to a pattern.
    Pattern { pattern: String },
    /// Matching against a pattern exceeded its backtracking budget.
    PatternTimeout { pattern: String },
    /// When a required property is missing.
    Required { property: Value },
    /// When the input value doesn't match one or multiple required types.
    Type { kind: TypeKind },
    /// Two array items are equal.
    UniqueItems { first: usize, second: usize },
}

/// Expected types in a `type` error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TypeKind {
    Single(PrimitiveType),
    Multiple(PrimitiveTypes),
}

impl ValidationError<'_> {
    /// Detach the error from the validated instance.
    pub fn into_owned(self) -> ValidationError<'static> {
        ValidationError {
            instance: Cow::Owned(self.instance.into_owned()),
            kind: self.kind,
            keyword: self.keyword,
            instance_path: self.instance_path,
            schema_path: self.schema_path,
            schema_base_uri: self.schema_base_uri,
            referencing_uri: self.referencing_uri,
        }
    }
}

impl error::Error for ValidationError<'_> {}

fn plural(count: u64, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

fn unexpected_verb(count: usize) -> &'static str {
    if count == 1 {
        "was"
    } else {
        "were"
    }
}

/// Textual representation of various validation errors.
impl fmt::Display for ValidationError<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::Format { format } => {
                write!(f, r#"{} is not a "{}""#, self.instance, format)
            }
            ValidationErrorKind::AdditionalItems { limit } => {
                let extras: Vec<String> = self
                    .instance
                    .as_array()
                    .map(|items| items.iter().skip(*limit).map(ToString::to_string).collect())
                    .unwrap_or_default();
                write!(
                    f,
                    "Additional items are not allowed ({} {} unexpected)",
                    extras.join(", "),
                    unexpected_verb(extras.len())
                )
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => write!(
                f,
                "Additional properties are not allowed ({} {} unexpected)",
                unexpected
                    .iter()
                    .map(|name| format!("'{name}'"))
                    .collect::<Vec<_>>()
                    .join(", "),
                unexpected_verb(unexpected.len())
            ),
            ValidationErrorKind::AnyOf => write!(
                f,
                "{} is not valid under any of the schemas listed in the 'anyOf' keyword",
                self.instance
            ),
            ValidationErrorKind::OneOfNotValid => write!(
                f,
                "{} is not valid under any of the schemas listed in the 'oneOf' keyword",
                self.instance
            ),
            ValidationErrorKind::OneOfMultipleValid => write!(
                f,
                "{} is valid under more than one of the schemas listed in the 'oneOf' keyword",
                self.instance
            ),
            ValidationErrorKind::Contains => write!(
                f,
                "None of {} are valid under the given schema",
                self.instance
            ),
            ValidationErrorKind::MinContains { limit, matched } => write!(
                f,
                "{} contains {} matching item{}, fewer than the minimum of {}",
                self.instance,
                matched,
                plural(*matched, "", "s"),
                limit
            ),
            ValidationErrorKind::MaxContains { limit, matched } => write!(
                f,
                "{} contains {} matching item{}, more than the maximum of {}",
                self.instance,
                matched,
                plural(*matched, "", "s"),
                limit
            ),
            ValidationErrorKind::Constant { expected_value } => {
                write!(f, "{} was expected, got {}", expected_value, self.instance)
            }
            ValidationErrorKind::Enum { options } => {
                write!(f, "{} is not one of {}", self.instance, options)
            }
            ValidationErrorKind::ExclusiveMaximum { limit } => write!(
                f,
                "{} is greater than or equal to the maximum of {}",
                self.instance, limit
            ),
            ValidationErrorKind::ExclusiveMinimum { limit } => write!(
                f,
                "{} is less than or equal to the minimum of {}",
                self.instance, limit
            ),
            ValidationErrorKind::FalseSchema => {
                write!(f, "False schema does not allow {}", self.instance)
            }
            ValidationErrorKind::Maximum { limit } => write!(
                f,
                "{} is greater than the maximum of {}",
                self.instance, limit
            ),
            ValidationErrorKind::Minimum { limit } => {
                write!(f, "{} is less than the minimum of {}", self.instance, limit)
            }
            ValidationErrorKind::MaxLength { limit, length } => write!(
                f,
                "{} is longer than {} character{} ({} given)",
                self.instance,
                limit,
                plural(*limit, "", "s"),
                length
            ),
            ValidationErrorKind::MinLength { limit, length } => write!(
                f,
                "{} is shorter than {} character{} ({} given)",
                self.instance,
                limit,
                plural(*limit, "", "s"),
                length
            ),
            ValidationErrorKind::MaxItems { limit } => write!(
                f,
                "{} has more than {} item{}",
                self.instance,
                limit,
                plural(*limit, "", "s")
            ),
            ValidationErrorKind::MinItems { limit } => write!(
                f,
                "{} has less than {} item{}",
                self.instance,
                limit,
                plural(*limit, "", "s")
            ),
            ValidationErrorKind::MaxProperties { limit } => write!(
                f,
                "{} has more than {} propert{}",
                self.instance,
                limit,
                plural(*limit, "y", "ies")
            ),
            ValidationErrorKind::MinProperties { limit } => write!(
                f,
                "{} has less than {} propert{}",
                self.instance,
                limit,
                plural(*limit, "y", "ies")
            ),
            ValidationErrorKind::Not { schema } => {
                write!(f, "{} is not allowed for {}", schema, self.instance)
            }
            ValidationErrorKind::Pattern { pattern } => {
                write!(f, r#"{} does not match "{}""#, self.instance, pattern)
            }
            ValidationErrorKind::PatternTimeout { pattern } => write!(
                f,
                r#"Matching {} against "{}" exceeded the backtracking limit"#,
                self.instance, pattern
            ),
            ValidationErrorKind::Required { property } => {
                write!(f, "{} is a required property", property)
            }
            ValidationErrorKind::MultipleOf { multiple_of } => {
                write!(f, "{} is not a multiple of {}", self.instance, multiple_of)
            }
            ValidationErrorKind::UniqueItems { first, second } => write!(
                f,
                "{} has non-unique elements (items {} and {} are equal)",
                self.instance, first, second
            ),
            ValidationErrorKind::Type {
                kind: TypeKind::Single(type_),
            } => write!(f, r#"{} is not of type "{}""#, self.instance, type_),
            ValidationErrorKind::Type {
                kind: TypeKind::Multiple(types),
            } => write!(f, "{} is not of types {}", self.instance, types),
        }
    }
}

/// A schema that cannot be used for validation.
///
/// Faults abort the whole `compile` or `validate` call. They are never mixed into the list of
/// validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema or instance text is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A value that should be a schema is neither an object nor a boolean.
    #[error("{value} is not a valid schema (at '{location}')")]
    InvalidSchema { location: Location, value: Value },
    /// A keyword has a value of the wrong shape.
    #[error("Invalid value for '{keyword}' at '{location}': {message}")]
    InvalidKeyword {
        keyword: &'static str,
        location: Location,
        message: String,
    },
    /// A pattern is not a valid regular expression.
    #[error("Invalid regular expression \"{pattern}\": {message}")]
    InvalidPattern { pattern: String, message: String },
    /// An identifier or reference cannot be resolved into an absolute URI.
    #[error("Invalid URI reference \"{reference}\" against \"{base}\": {source}")]
    InvalidUri {
        reference: String,
        base: String,
        #[source]
        source: url::ParseError,
    },
    /// Two schema resources share the same absolute base URI.
    #[error("Duplicate schema resource \"{uri}\"")]
    DuplicateResource { uri: String },
    /// `$schema` names a dialect that is not supported.
    #[error("Unknown dialect \"{uri}\"")]
    UnknownDialect { uri: String },
    /// `format` names a format that is not known and unknown formats are not ignored.
    #[error("Unknown format \"{format}\"")]
    UnknownFormat { format: String },
    /// A `$ref`, `$dynamicRef` or `$recursiveRef` points nowhere.
    #[error("Unresolvable reference \"{uri}\"")]
    UnresolvableReference { uri: String },
    /// A reference re-entered the same schema at the same instance location.
    #[error("Infinite recursion through \"{uri}\" at instance location '{instance_location}'")]
    InfiniteRecursion {
        uri: String,
        instance_location: Location,
    },
}

impl SchemaError {
    pub(crate) fn invalid_keyword(
        keyword: &'static str,
        location: &Location,
        message: impl Into<String>,
    ) -> SchemaError {
        SchemaError::InvalidKeyword {
            keyword,
            location: location.clone(),
            message: message.into(),
        }
    }

    pub(crate) fn unresolvable(uri: &str) -> SchemaError {
        tracing::debug!(uri, "Reference cannot be resolved");
        SchemaError::UnresolvableReference {
            uri: uri.to_string(),
        }
    }
}
