//! Facilities for working with paths within schemas or validated instances.
use std::{borrow::Cow, fmt, sync::Arc};

/// A location segment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LocationSegment<'a> {
    /// Property name within a JSON object or a schema keyword.
    Property(&'a str),
    /// Index within a JSON array.
    Index(usize),
}

impl fmt::Display for LocationSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSegment::Property(property) => f.write_str(property),
            LocationSegment::Index(idx) => f.write_str(itoa::Buffer::new().format(*idx)),
        }
    }
}

impl<'a> From<&'a str> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a str) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl<'a> From<&'a String> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a String) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl From<usize> for LocationSegment<'_> {
    #[inline]
    fn from(value: usize) -> Self {
        LocationSegment::Index(value)
    }
}

/// A lazily constructed location within a JSON instance.
///
/// Segments live on the call stack and are only turned into a [`Location`] when an error or a
/// recursion record needs an owned path.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LazyLocation<'a, 'b> {
    pub(crate) segment: LocationSegment<'a>,
    pub(crate) parent: Option<&'b LazyLocation<'b, 'a>>,
}

impl Default for LazyLocation<'_, '_> {
    fn default() -> Self {
        LazyLocation::new()
    }
}

impl<'a, 'b> LazyLocation<'a, 'b> {
    /// Create the root of an instance location.
    pub const fn new() -> Self {
        LazyLocation {
            // Never read for the root
            segment: LocationSegment::Index(0),
            parent: None,
        }
    }

    /// Push a new segment.
    #[inline]
    pub fn push(&'a self, segment: impl Into<LocationSegment<'a>>) -> Self {
        LazyLocation {
            segment: segment.into(),
            parent: Some(self),
        }
    }
}

impl<'a> From<&'a LazyLocation<'_, '_>> for Location {
    fn from(value: &'a LazyLocation<'_, '_>) -> Self {
        let mut segments = Vec::new();
        let mut head = value;
        while let Some(next) = head.parent {
            segments.push(head.segment);
            head = next;
        }
        segments.reverse();
        Location::from_segments(&segments)
    }
}

/// A cheap to clone JSON pointer that represents a location within a JSON value or a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(Arc<String>);

impl Location {
    /// Create a new, empty `Location`.
    pub fn new() -> Self {
        Self(Arc::new(String::new()))
    }

    pub(crate) fn from_segments(segments: &[LocationSegment<'_>]) -> Self {
        let mut buffer = String::new();
        for segment in segments {
            push_segment(&mut buffer, *segment);
        }
        Self(Arc::new(buffer))
    }

    pub(crate) fn join<'a>(&self, segment: impl Into<LocationSegment<'a>>) -> Self {
        let mut buffer = String::with_capacity(self.0.len() + 8);
        buffer.push_str(&self.0);
        push_segment(&mut buffer, segment.into());
        Self(Arc::new(buffer))
    }

    /// Get a string slice representing the location.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this location points at the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

fn push_segment(buffer: &mut String, segment: LocationSegment<'_>) {
    buffer.push('/');
    match segment {
        LocationSegment::Property(property) => write_escaped_str(buffer, property),
        LocationSegment::Index(idx) => buffer.push_str(itoa::Buffer::new().format(idx)),
    }
}

fn write_escaped_str(buffer: &mut String, value: &str) {
    let mut remaining = value;
    while let Some(idx) = remaining.find(['~', '/']) {
        let (before, after) = remaining.split_at(idx);
        buffer.push_str(before);
        if after.starts_with('~') {
            buffer.push_str("~0");
        } else {
            buffer.push_str("~1");
        }
        remaining = &after[1..];
    }
    buffer.push_str(remaining);
}

/// Split a JSON pointer into its unescaped reference tokens.
///
/// The leading `/` is required for a non-empty pointer; an empty pointer yields no tokens.
pub(crate) fn pointer_tokens(pointer: &str) -> Option<Vec<Cow<'_, str>>> {
    if pointer.is_empty() {
        return Some(Vec::new());
    }
    let rest = pointer.strip_prefix('/')?;
    Some(rest.split('/').map(unescape_token).collect())
}

fn unescape_token(token: &str) -> Cow<'_, str> {
    if token.contains('~') {
        Cow::Owned(token.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(token)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
