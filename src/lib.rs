//! A JSON Schema validator for Rust.
//!
//! - Drafts 7, 2019-09 and 2020-12, selected by `$schema`
//! - `$ref`, `$dynamicRef` and `$recursiveRef` across embedded and external documents
//! - Fail-fast and list output modes
//! - A bounded, shared cache of ECMA 262 patterns with a per-match time budget
//!
//! # Validation
//!
//! For one-off checks use [`is_valid`]:
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({"type": "string"});
//! assert!(schemascope::is_valid(&schema, &json!("Hello, world!")));
//! ```
//!
//! When validating many instances, load the schema once and reuse the [`SchemaDocument`]:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use schemascope::OutputMode;
//!
//! let document = schemascope::compile(r#"{"type": "object", "required": ["name"]}"#)?;
//!
//! let outcome = document.validate(r#"{"age": 3}"#, OutputMode::List)?;
//! for error in outcome.errors() {
//!     eprintln!("Error: {error}");
//!     eprintln!("Location: {}", error.instance_path);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Invalid instances are reported through [`Outcome`]. A [`SchemaError`] means the schema
//! itself could not be used: it is malformed, a reference cannot be resolved or recursion
//! never terminates.
//!
//! # Configuration
//!
//! [`options`] returns a [`ValidationOptions`] builder:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use serde_json::json;
//! use schemascope::Draft;
//!
//! let document = schemascope::options()
//!     .with_draft(Draft::Draft7)
//!     .should_validate_formats(true)
//!     .build(&json!({"format": "date"}))?;
//! assert!(!document.is_valid(&json!("2024-02-30"))?);
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Loading and reference resolution emit [`tracing`](https://docs.rs/tracing) events at the
//! `debug` and `trace` levels. No subscriber is installed by the library.
mod compiler;
mod context;
mod draft;
mod ecma;
mod error;
mod keywords;
mod node;
mod options;
mod output;
mod paths;
mod pattern_cache;
mod primitive_type;
mod registry;
mod resolver;
mod uri;
mod validator;

pub use draft::Draft;
pub use error::{SchemaError, TypeKind, ValidationError, ValidationErrorKind};
pub use options::ValidationOptions;
pub use output::{Outcome, OutputMode};
pub use paths::{Location, LocationSegment};
pub use pattern_cache::{MatchError, Matcher, PatternCache};
pub use primitive_type::{PrimitiveType, PrimitiveTypes};
pub use validator::SchemaDocument;

use serde_json::Value;

/// Validate `instance` against `schema` and get a `true` if the instance is valid and `false`
/// otherwise. Draft is detected automatically.
///
/// ```rust
/// use serde_json::json;
///
/// let schema = json!({"maxLength": 5});
/// let instance = json!("foo");
/// assert!(schemascope::is_valid(&schema, &instance));
/// ```
///
/// # Panics
///
/// This function panics if the schema is invalid or if validation raises a [`SchemaError`].
#[must_use]
#[inline]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    validator_for(schema)
        .expect("Invalid schema")
        .is_valid(instance)
        .expect("Schema fault during validation")
}

/// Parse `schema` as JSON and load it with default options.
///
/// # Errors
///
/// Returns a [`SchemaError`] on malformed JSON or an unusable schema.
pub fn compile(schema: &str) -> Result<SchemaDocument, SchemaError> {
    options().compile(schema)
}

/// Load an already parsed schema with default options.
///
/// ```rust
/// use serde_json::json;
///
/// let document = schemascope::validator_for(&json!({"minimum": 5})).expect("A valid schema");
/// assert!(document.is_valid(&json!(42)).expect("No faults"));
/// ```
///
/// # Errors
///
/// Returns a [`SchemaError`] if the schema cannot be used for validation.
pub fn validator_for(schema: &Value) -> Result<SchemaDocument, SchemaError> {
    options().build(schema)
}

/// Create a builder for configuring a [`SchemaDocument`].
#[must_use]
pub fn options() -> ValidationOptions {
    SchemaDocument::options()
}

/// Functionality for validating JSON Schema Draft 7 documents.
pub mod draft7 {
    use super::*;

    /// Load a schema as Draft 7 unless it declares another dialect.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the schema cannot be used for validation.
    pub fn new(schema: &Value) -> Result<SchemaDocument, SchemaError> {
        options().build(schema)
    }

    /// Validate an instance against a schema using Draft 7 without keeping the document.
    ///
    /// # Panics
    ///
    /// Panics if the schema is invalid or if validation raises a [`SchemaError`].
    #[must_use]
    pub fn is_valid(schema: &Value, instance: &Value) -> bool {
        new(schema)
            .expect("Invalid schema")
            .is_valid(instance)
            .expect("Schema fault during validation")
    }

    /// Creates a [`ValidationOptions`] builder pre-configured for Draft 7.
    #[must_use]
    pub fn options() -> ValidationOptions {
        let mut options = crate::options();
        options.with_draft(Draft::Draft7);
        options
    }
}

/// Functionality for validating JSON Schema Draft 2019-09 documents.
pub mod draft201909 {
    use super::*;

    /// Load a schema as Draft 2019-09 unless it declares another dialect.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the schema cannot be used for validation.
    pub fn new(schema: &Value) -> Result<SchemaDocument, SchemaError> {
        options().build(schema)
    }

    /// Validate an instance against a schema using Draft 2019-09 without keeping the document.
    ///
    /// # Panics
    ///
    /// Panics if the schema is invalid or if validation raises a [`SchemaError`].
    #[must_use]
    pub fn is_valid(schema: &Value, instance: &Value) -> bool {
        new(schema)
            .expect("Invalid schema")
            .is_valid(instance)
            .expect("Schema fault during validation")
    }

    /// Creates a [`ValidationOptions`] builder pre-configured for Draft 2019-09.
    #[must_use]
    pub fn options() -> ValidationOptions {
        let mut options = crate::options();
        options.with_draft(Draft::Draft201909);
        options
    }
}

/// Functionality for validating JSON Schema Draft 2020-12 documents.
pub mod draft202012 {
    use super::*;

    /// Load a schema as Draft 2020-12 unless it declares another dialect.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the schema cannot be used for validation.
    pub fn new(schema: &Value) -> Result<SchemaDocument, SchemaError> {
        options().build(schema)
    }

    /// Validate an instance against a schema using Draft 2020-12 without keeping the document.
    ///
    /// # Panics
    ///
    /// Panics if the schema is invalid or if validation raises a [`SchemaError`].
    #[must_use]
    pub fn is_valid(schema: &Value, instance: &Value) -> bool {
        new(schema)
            .expect("Invalid schema")
            .is_valid(instance)
            .expect("Schema fault during validation")
    }

    /// Creates a [`ValidationOptions`] builder pre-configured for Draft 2020-12.
    #[must_use]
    pub fn options() -> ValidationOptions {
        let mut options = crate::options();
        options.with_draft(Draft::Draft202012);
        options
    }
}

#[cfg(test)]
pub(crate) mod tests_util {
    use crate::{OutputMode, SchemaDocument, ValidationError};
    use serde_json::Value;

    pub(crate) fn is_not_valid_with(document: &SchemaDocument, instance: &Value) {
        assert!(
            !document.is_valid(instance).expect("No faults"),
            "{} should not be valid (via is_valid)",
            instance
        );
        for mode in [OutputMode::FailFast, OutputMode::List] {
            let outcome = document.validate_value(instance, mode).expect("No faults");
            assert!(
                !outcome.is_valid(),
                "{} should not be valid (via {:?})",
                instance,
                mode
            );
        }
        let outcome = document
            .validate_value(instance, OutputMode::FailFast)
            .expect("No faults");
        assert_eq!(outcome.errors().len(), 1, "Fail-fast reports exactly one error");
    }

    pub(crate) fn is_not_valid(schema: &Value, instance: &Value) {
        let document = crate::validator_for(schema).expect("Valid schema");
        is_not_valid_with(&document, instance);
    }

    pub(crate) fn is_not_valid_with_draft(draft: crate::Draft, schema: &Value, instance: &Value) {
        let document = crate::options()
            .with_draft(draft)
            .build(schema)
            .expect("Valid schema");
        is_not_valid_with(&document, instance);
    }

    pub(crate) fn is_valid_with(document: &SchemaDocument, instance: &Value) {
        for mode in [OutputMode::FailFast, OutputMode::List] {
            let outcome = document.validate_value(instance, mode).expect("No faults");
            if let Some(first) = outcome.errors().first() {
                panic!(
                    "{} should be valid (via {:?}). Error: {} at {}",
                    instance, mode, first, first.instance_path
                );
            }
        }
        assert!(
            document.is_valid(instance).expect("No faults"),
            "{} should be valid (via is_valid)",
            instance
        );
    }

    pub(crate) fn is_valid(schema: &Value, instance: &Value) {
        let document = crate::validator_for(schema).expect("Valid schema");
        is_valid_with(&document, instance);
    }

    pub(crate) fn is_valid_with_draft(draft: crate::Draft, schema: &Value, instance: &Value) {
        let document = crate::options()
            .with_draft(draft)
            .build(schema)
            .expect("Valid schema");
        is_valid_with(&document, instance);
    }

    pub(crate) fn errors(
        schema: &Value,
        instance: &Value,
        mode: OutputMode,
    ) -> Vec<ValidationError<'static>> {
        crate::validator_for(schema)
            .expect("Valid schema")
            .validate_value(instance, mode)
            .expect("No faults")
            .into_owned()
            .into_errors()
    }

    /// Compare the messages of every error in list mode.
    pub(crate) fn expect_errors(schema: &Value, instance: &Value, expected: &[&str]) {
        let messages: Vec<String> = errors(schema, instance, OutputMode::List)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(messages, expected);
    }

    fn first_error(schema: &Value, instance: &Value) -> ValidationError<'static> {
        errors(schema, instance, OutputMode::FailFast)
            .into_iter()
            .next()
            .expect("Should be an error")
    }

    pub(crate) fn assert_schema_location(schema: &Value, instance: &Value, expected: &str) {
        let error = first_error(schema, instance);
        assert_eq!(error.schema_path.as_str(), expected);
    }

    pub(crate) fn assert_keyword(schema: &Value, instance: &Value, expected: &str) {
        let error = first_error(schema, instance);
        assert_eq!(error.keyword, expected);
    }
}

#[cfg(test)]
mod tests {
    use super::Draft;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(crate::is_valid ; "autodetect")]
    #[test_case(crate::draft7::is_valid ; "draft7")]
    #[test_case(crate::draft201909::is_valid ; "draft201909")]
    #[test_case(crate::draft202012::is_valid ; "draft202012")]
    fn test_is_valid(is_valid_fn: fn(&serde_json::Value, &serde_json::Value) -> bool) {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer", "minimum": 0}
            },
            "required": ["name"]
        });
        assert!(is_valid_fn(&schema, &json!({"name": "John Doe", "age": 30})));
        assert!(!is_valid_fn(&schema, &json!({"age": -5})));
    }

    #[test_case(Draft::Draft7)]
    #[test_case(Draft::Draft201909)]
    #[test_case(Draft::Draft202012)]
    fn enum_edge_cases_load(draft: Draft) {
        for schema in [json!({"enum": [0, 0.0]}), json!({"enum": []})] {
            assert!(crate::options().with_draft(draft).build(&schema).is_ok());
        }
    }

    #[test]
    fn incomplete_escape_in_pattern() {
        assert!(crate::validator_for(&json!({"pattern": "\\u"})).is_err());
    }

    #[test]
    fn malformed_schema_text() {
        assert!(matches!(
            crate::compile("{\"type\": "),
            Err(crate::SchemaError::Json(_))
        ));
    }

    #[test]
    fn schema_error_propagation() {
        fn load() -> Result<bool, Box<dyn std::error::Error>> {
            let document = crate::compile("{}")?;
            Ok(document.is_valid(&json!({}))?)
        }
        assert!(load().expect("No faults"));
    }
}
