//! Composition of keyword results into validation outcomes.
//!
//! Keywords return an [`Evaluation`]. In list mode every failing child contributes an
//! [`ErrorTree`] which is nested into its parent without copying; the tree is flattened into an
//! ordered list only once, when the final [`Outcome`] is produced.
use std::vec;

use serde::ser::{SerializeMap, SerializeSeq};

use crate::error::{SchemaError, ValidationError};

pub(crate) type EvaluationResult<'i> = Result<Evaluation<'i>, SchemaError>;

/// How much detail a validation call collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Stop at the first failing keyword and report exactly one error.
    #[default]
    FailFast,
    /// Evaluate every applicable keyword and report every error.
    List,
}

/// Errors of one failing subtree, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ErrorTree<'i> {
    Leaf(ValidationError<'i>),
    Branch(Vec<ErrorTree<'i>>),
}

impl<'i> ErrorTree<'i> {
    pub(crate) fn into_owned(self) -> ErrorTree<'static> {
        match self {
            ErrorTree::Leaf(error) => ErrorTree::Leaf(error.into_owned()),
            ErrorTree::Branch(children) => {
                ErrorTree::Branch(children.into_iter().map(ErrorTree::into_owned).collect())
            }
        }
    }
}

impl<'i> IntoIterator for ErrorTree<'i> {
    type Item = ValidationError<'i>;
    type IntoIter = Flatten<'i>;

    fn into_iter(self) -> Self::IntoIter {
        Flatten {
            stack: vec![vec![self].into_iter()],
        }
    }
}

/// Depth-first iterator over the leaves of an [`ErrorTree`].
#[derive(Debug)]
pub(crate) struct Flatten<'i> {
    stack: Vec<vec::IntoIter<ErrorTree<'i>>>,
}

impl<'i> Iterator for Flatten<'i> {
    type Item = ValidationError<'i>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.stack.last_mut()?;
            match current.next() {
                Some(ErrorTree::Leaf(error)) => return Some(error),
                Some(ErrorTree::Branch(children)) => self.stack.push(children.into_iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Result of evaluating a schema node or a keyword.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Evaluation<'i> {
    Valid,
    Invalid(ErrorTree<'i>),
}

impl<'i> Evaluation<'i> {
    pub(crate) const fn is_valid(&self) -> bool {
        matches!(self, Evaluation::Valid)
    }

    pub(crate) fn into_owned(self) -> Evaluation<'static> {
        match self {
            Evaluation::Valid => Evaluation::Valid,
            Evaluation::Invalid(tree) => Evaluation::Invalid(tree.into_owned()),
        }
    }

    pub(crate) fn into_outcome(self) -> Outcome<'i> {
        match self {
            Evaluation::Valid => Outcome::Valid,
            Evaluation::Invalid(tree) => Outcome::Invalid(tree.into_iter().collect()),
        }
    }
}

impl<'i> From<ValidationError<'i>> for Evaluation<'i> {
    fn from(error: ValidationError<'i>) -> Self {
        Evaluation::Invalid(ErrorTree::Leaf(error))
    }
}

/// Gathers child evaluations for a composite keyword.
///
/// In fail-fast mode it keeps the first failure and tells the caller to stop. In list mode it
/// keeps every failure.
#[derive(Debug)]
pub(crate) struct ErrorCollector<'i> {
    mode: OutputMode,
    children: Vec<ErrorTree<'i>>,
}

impl<'i> ErrorCollector<'i> {
    pub(crate) const fn new(mode: OutputMode) -> Self {
        ErrorCollector {
            mode,
            children: Vec::new(),
        }
    }

    /// Record a child evaluation. Returns `true` once no further children need evaluating.
    pub(crate) fn push(&mut self, evaluation: Evaluation<'i>) -> bool {
        if let Evaluation::Invalid(tree) = evaluation {
            self.children.push(tree);
            self.mode == OutputMode::FailFast
        } else {
            false
        }
    }

    /// Record this keyword's own error after its children.
    pub(crate) fn push_error(&mut self, error: ValidationError<'i>) {
        self.children.push(ErrorTree::Leaf(error));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn finish(mut self) -> Evaluation<'i> {
        match self.children.len() {
            0 => Evaluation::Valid,
            1 => Evaluation::Invalid(self.children.remove(0)),
            _ => Evaluation::Invalid(ErrorTree::Branch(self.children)),
        }
    }
}

/// The outcome of validating one instance.
///
/// In [`OutputMode::FailFast`] an invalid outcome holds exactly one error. In
/// [`OutputMode::List`] it holds every error in evaluation order.
///
/// ```rust
/// use schemascope::OutputMode;
///
/// let document = schemascope::compile(r#"{"type": "string", "minLength": 3}"#)
///     .expect("A valid schema");
/// let outcome = document.validate("\"ab\"", OutputMode::List).expect("No faults");
/// assert!(!outcome.is_valid());
/// assert_eq!(outcome.errors()[0].keyword, "minLength");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'i> {
    /// The instance conforms to the schema.
    Valid,
    /// The instance does not conform to the schema.
    Invalid(Vec<ValidationError<'i>>),
}

impl<'i> Outcome<'i> {
    /// Whether the instance conforms to the schema.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid)
    }

    /// Errors in evaluation order; empty for a valid outcome.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError<'i>] {
        match self {
            Outcome::Valid => &[],
            Outcome::Invalid(errors) => errors,
        }
    }

    /// Take the errors out of the outcome.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError<'i>> {
        match self {
            Outcome::Valid => Vec::new(),
            Outcome::Invalid(errors) => errors,
        }
    }

    /// Detach the outcome from the validated instance.
    #[must_use]
    pub fn into_owned(self) -> Outcome<'static> {
        match self {
            Outcome::Valid => Outcome::Valid,
            Outcome::Invalid(errors) => Outcome::Invalid(
                errors
                    .into_iter()
                    .map(ValidationError::into_owned)
                    .collect(),
            ),
        }
    }
}

struct ErrorUnits<'a, 'i>(&'a [ValidationError<'i>]);

struct ErrorUnit<'a, 'i>(&'a ValidationError<'i>);

impl serde::Serialize for Outcome<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Outcome::Valid => {
                let mut map_ser = serializer.serialize_map(Some(1))?;
                map_ser.serialize_entry("valid", &true)?;
                map_ser.end()
            }
            Outcome::Invalid(errors) => {
                let mut map_ser = serializer.serialize_map(Some(2))?;
                map_ser.serialize_entry("valid", &false)?;
                map_ser.serialize_entry("errors", &ErrorUnits(errors))?;
                map_ser.end()
            }
        }
    }
}

impl serde::Serialize for ErrorUnits<'_, '_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for error in self.0 {
            seq.serialize_element(&ErrorUnit(error))?;
        }
        seq.end()
    }
}

impl serde::Serialize for ErrorUnit<'_, '_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let error = self.0;
        let mut map_ser = serializer.serialize_map(None)?;
        map_ser.serialize_entry("keyword", error.keyword)?;
        map_ser.serialize_entry("keywordLocation", &error.schema_path)?;
        map_ser.serialize_entry("instanceLocation", &error.instance_path)?;
        if let Some(base) = &error.schema_base_uri {
            map_ser.serialize_entry("schemaBaseUri", base.as_ref())?;
        }
        if let Some(uri) = &error.referencing_uri {
            map_ser.serialize_entry("referencingUri", uri.as_ref())?;
        }
        map_ser.serialize_entry("error", &error.to_string())?;
        map_ser.end()
    }
}
