use crate::{
    draft::Draft,
    error::SchemaError,
    keywords::format::Format,
    pattern_cache::{PatternCache, DEFAULT_MATCH_TIMEOUT},
    uri::DEFAULT_ROOT_URI,
    validator::SchemaDocument,
};
use ahash::AHashMap;
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};

/// Configuration options for JSON Schema validation.
#[derive(Clone)]
pub struct ValidationOptions {
    draft: Option<Draft>,
    formats: AHashMap<String, Arc<dyn Format>>,
    validate_formats: bool,
    ignore_unknown_formats: bool,
    base_uri: Option<String>,
    pattern_cache: Arc<PatternCache>,
    pattern_timeout: Duration,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            draft: None,
            formats: AHashMap::default(),
            validate_formats: false,
            ignore_unknown_formats: true,
            base_uri: None,
            pattern_cache: Arc::new(PatternCache::default()),
            pattern_timeout: DEFAULT_MATCH_TIMEOUT,
        }
    }
}

impl ValidationOptions {
    /// Dialect used for schemas without `$schema`.
    pub(crate) fn draft(&self) -> Draft {
        self.draft.unwrap_or_default()
    }

    /// Build a [`SchemaDocument`] from a parsed schema.
    ///
    /// ```rust
    /// # use serde_json::json;
    /// let document = schemascope::options()
    ///     .should_validate_formats(true)
    ///     .build(&json!({"format": "ipv4"}))
    ///     .expect("A valid schema");
    /// assert!(!document.is_valid(&json!("999.1.1.1")).expect("No faults"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the schema cannot be used for validation.
    pub fn build(&self, schema: &Value) -> Result<SchemaDocument, SchemaError> {
        SchemaDocument::new(self.clone(), schema)
    }

    /// Parse `schema` as JSON and build a [`SchemaDocument`] from it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] on malformed text or any other load fault.
    pub fn compile(&self, schema: &str) -> Result<SchemaDocument, SchemaError> {
        let schema: Value = serde_json::from_str(schema)?;
        self.build(&schema)
    }

    /// Force a dialect for schemas that do not declare `$schema`.
    #[inline]
    pub fn with_draft(&mut self, draft: Draft) -> &mut Self {
        self.draft = Some(draft);
        self
    }

    /// Register a custom format checker. It replaces a built-in format with the same name.
    ///
    /// ```rust
    /// # use serde_json::json;
    /// let document = schemascope::options()
    ///     .should_validate_formats(true)
    ///     .with_format("even-length", |value: &str| value.len() % 2 == 0)
    ///     .build(&json!({"format": "even-length"}))
    ///     .expect("A valid schema");
    /// assert!(document.is_valid(&json!("ab")).expect("No faults"));
    /// assert!(!document.is_valid(&json!("abc")).expect("No faults"));
    /// ```
    pub fn with_format<N, F>(&mut self, name: N, format: F) -> &mut Self
    where
        N: Into<String>,
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.into(), Arc::new(format));
        self
    }

    pub(crate) fn get_format(&self, format: &str) -> Option<&Arc<dyn Format>> {
        self.formats.get(format)
    }

    /// Set whether `format` is checked. Disabled by default, in which case `format` never fails.
    #[inline]
    pub fn should_validate_formats(&mut self, yes: bool) -> &mut Self {
        self.validate_formats = yes;
        self
    }

    pub(crate) const fn validate_formats(&self) -> bool {
        self.validate_formats
    }

    /// Set whether to ignore unknown formats.
    ///
    /// By default, unknown formats are silently ignored. Set to `false` to reject schemas that
    /// use them.
    pub fn should_ignore_unknown_formats(&mut self, yes: bool) -> &mut Self {
        self.ignore_unknown_formats = yes;
        self
    }

    pub(crate) const fn are_unknown_formats_ignored(&self) -> bool {
        self.ignore_unknown_formats
    }

    /// Base URI for a root schema without an absolute `$id`.
    pub fn with_base_uri(&mut self, base_uri: impl Into<String>) -> &mut Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub(crate) fn base_uri(&self) -> &str {
        self.base_uri.as_deref().unwrap_or(DEFAULT_ROOT_URI)
    }

    /// Share a pattern cache between documents.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use serde_json::json;
    /// use schemascope::PatternCache;
    ///
    /// let cache = Arc::new(PatternCache::new(32));
    /// let first = schemascope::options()
    ///     .with_pattern_cache(Arc::clone(&cache))
    ///     .build(&json!({"pattern": "^a"}))
    ///     .expect("A valid schema");
    /// let second = schemascope::options()
    ///     .with_pattern_cache(Arc::clone(&cache))
    ///     .build(&json!({"pattern": "^a"}))
    ///     .expect("A valid schema");
    /// assert_eq!(cache.len(), 1);
    /// # drop((first, second));
    /// ```
    pub fn with_pattern_cache(&mut self, cache: Arc<PatternCache>) -> &mut Self {
        self.pattern_cache = cache;
        self
    }

    pub(crate) fn pattern_cache(&self) -> &PatternCache {
        &self.pattern_cache
    }

    /// Upper bound on the time spent matching one pattern.
    ///
    /// It is enforced as a backtracking step budget; exceeding it fails the matching keyword.
    pub fn with_pattern_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.pattern_timeout = timeout;
        self
    }

    pub(crate) const fn pattern_timeout(&self) -> Duration {
        self.pattern_timeout
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("ValidationOptions")
            .field("draft", &self.draft)
            .field("formats", &self.formats.keys())
            .field("validate_formats", &self.validate_formats)
            .field("ignore_unknown_formats", &self.ignore_unknown_formats)
            .field("base_uri", &self.base_uri)
            .field("pattern_timeout", &self.pattern_timeout)
            .finish()
    }
}
