//! URI reference handling for schema identifiers and references.
use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::SchemaError;

/// Base URI given to a root schema that declares no absolute `$id`.
pub(crate) const DEFAULT_ROOT_URI: &str = "json-schema:///";

/// Resolve `reference` against `base` following RFC 3986.
///
/// An empty reference inherits `base` unchanged. An empty trailing fragment is dropped, so
/// `https://example.com/a#` and `https://example.com/a` name the same resource.
pub(crate) fn resolve(base: &str, reference: &str) -> Result<String, SchemaError> {
    if reference.is_empty() {
        return Ok(base.to_string());
    }
    let invalid = |source| SchemaError::InvalidUri {
        reference: reference.to_string(),
        base: base.to_string(),
        source,
    };
    let base_url = Url::parse(base).map_err(invalid)?;
    let mut resolved = base_url.join(reference).map_err(invalid)?;
    if resolved.fragment() == Some("") {
        resolved.set_fragment(None);
    }
    Ok(resolved.into())
}

/// The absolute URI of a resource, which never carries a fragment.
pub(crate) fn without_fragment(uri: &str) -> &str {
    split_fragment(uri).0
}

/// Split a full URI into its base and its raw (still percent-encoded) fragment.
pub(crate) fn split_fragment(uri: &str) -> (&str, &str) {
    match uri.split_once('#') {
        Some((base, fragment)) => (base, fragment),
        None => (uri, ""),
    }
}

pub(crate) fn decode_fragment(fragment: &str) -> Cow<'_, str> {
    percent_decode_str(fragment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("json-schema:///", "", "json-schema:///")]
    #[test_case("json-schema:///", "#/$defs/a", "json-schema:///#/$defs/a")]
    #[test_case("json-schema:///", "item.json", "json-schema:///item.json")]
    #[test_case("https://example.com/root.json", "item.json", "https://example.com/item.json")]
    #[test_case("https://example.com/a/b.json", "../c.json#foo", "https://example.com/c.json#foo")]
    #[test_case("https://example.com/a.json", "https://other.com/x#", "https://other.com/x")]
    #[test_case("urn:example:root", "#/defs", "urn:example:root#/defs")]
    fn resolution(base: &str, reference: &str, expected: &str) {
        assert_eq!(resolve(base, reference).expect("Valid URI"), expected);
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(matches!(
            resolve("relative/path", "a.json"),
            Err(SchemaError::InvalidUri { .. })
        ));
    }

    #[test_case("https://example.com/a#/b", ("https://example.com/a", "/b"))]
    #[test_case("https://example.com/a", ("https://example.com/a", ""))]
    #[test_case("urn:x#foo", ("urn:x", "foo"))]
    fn splitting(uri: &str, expected: (&str, &str)) {
        assert_eq!(split_fragment(uri), expected);
        assert_eq!(without_fragment(uri), expected.0);
    }

    #[test]
    fn fragments_are_percent_decoded() {
        assert_eq!(decode_fragment("/$defs/a%20b"), "/$defs/a b");
        assert_eq!(decode_fragment("%25"), "%");
    }
}
