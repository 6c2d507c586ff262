//! A bounded cache of regular-expression matchers shared across validations.
//!
//! Matchers start in a cheap interpreted form and are promoted to a fully compiled form once
//! they have been used often enough. Eviction is approximate LRU: a rotating window of entries
//! is sampled and the least used one is dropped.
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use ahash::AHashMap;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};

use crate::{ecma, error::SchemaError};

/// Default number of cached matchers.
pub const DEFAULT_CAPACITY: usize = 15;
/// Uses after which a matcher is compiled with the full engine.
pub const PROMOTION_THRESHOLD: u64 = 100;
/// Default match timeout.
pub const DEFAULT_MATCH_TIMEOUT: Duration = Duration::from_millis(100);

const EVICTION_WINDOW: usize = 30;
const BACKTRACK_STEPS_PER_MILLISECOND: u128 = 10_000;
// Keeps the interpreted form from building a large lazy DFA
const INTERPRETED_DFA_SIZE_LIMIT: usize = 1 << 12;

/// Matching failed without producing an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The backtracking budget derived from the match timeout was exhausted.
    Timeout,
    /// The engine refused to build or run the pattern.
    Engine(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Timeout => f.write_str("Pattern match exceeded the backtracking limit"),
            MatchError::Engine(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for MatchError {}

/// A lazily promoted regular expression.
pub struct Matcher {
    pattern: String,
    translated: String,
    backtrack_limit: usize,
    uses: AtomicU64,
    interpreted: OnceCell<fancy_regex::Regex>,
    compiled: OnceCell<fancy_regex::Regex>,
}

impl Matcher {
    /// Create an uncompiled matcher after checking the pattern syntax.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] when `pattern` is not a valid ECMA-262 pattern.
    pub fn new(pattern: &str, timeout: Duration) -> Result<Matcher, SchemaError> {
        let invalid = |message: String| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            message,
        };
        let translated = ecma::to_rust_regex(pattern).map_err(invalid)?;
        fancy_regex::Expr::parse_tree(&translated).map_err(|error| invalid(error.to_string()))?;
        let steps = timeout.as_millis().saturating_mul(BACKTRACK_STEPS_PER_MILLISECOND);
        Ok(Matcher {
            pattern: pattern.to_string(),
            translated: translated.into_owned(),
            backtrack_limit: usize::try_from(steps).unwrap_or(usize::MAX).max(1),
            uses: AtomicU64::new(0),
            interpreted: OnceCell::new(),
            compiled: OnceCell::new(),
        })
    }

    /// The original pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of times this matcher was used.
    pub fn uses(&self) -> u64 {
        self.uses.load(Ordering::Relaxed)
    }

    /// Whether the matcher has been promoted to its compiled form.
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Test `text` against the pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Timeout`] when backtracking exceeds the budget.
    pub fn is_match(&self, text: &str) -> Result<bool, MatchError> {
        let regex = self.engine()?;
        regex.is_match(text).map_err(|error| match error {
            fancy_regex::Error::RuntimeError(fancy_regex::RuntimeError::BacktrackLimitExceeded) => {
                MatchError::Timeout
            }
            other => MatchError::Engine(other.to_string()),
        })
    }

    fn engine(&self) -> Result<&fancy_regex::Regex, MatchError> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }
        let uses = self.uses.fetch_add(1, Ordering::Relaxed) + 1;
        if uses >= PROMOTION_THRESHOLD {
            return self.compiled.get_or_try_init(|| {
                tracing::trace!(pattern = %self.pattern, uses, "Promoting pattern matcher");
                self.build(None)
            });
        }
        self.interpreted
            .get_or_try_init(|| self.build(Some(INTERPRETED_DFA_SIZE_LIMIT)))
    }

    fn build(&self, dfa_size_limit: Option<usize>) -> Result<fancy_regex::Regex, MatchError> {
        let mut builder = fancy_regex::RegexBuilder::new(&self.translated);
        builder.backtrack_limit(self.backtrack_limit);
        if let Some(limit) = dfa_size_limit {
            builder.delegate_dfa_size_limit(limit);
        }
        builder
            .build()
            .map_err(|error| MatchError::Engine(error.to_string()))
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("pattern", &self.pattern)
            .field("uses", &self.uses())
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatternKey {
    pattern: String,
    timeout: Duration,
}

#[derive(Debug)]
struct CacheEntry {
    key: PatternKey,
    matcher: Arc<Matcher>,
    hits: AtomicU64,
}

impl CacheEntry {
    fn hit(&self) -> Arc<Matcher> {
        self.hits.fetch_add(1, Ordering::Relaxed);
        Arc::clone(&self.matcher)
    }

    fn is(&self, pattern: &str, timeout: Duration) -> bool {
        self.key.timeout == timeout && self.key.pattern == pattern
    }
}

#[derive(Debug, Default)]
struct Bookkeeping {
    slots: Vec<Arc<CacheEntry>>,
    window_start: usize,
}

/// Bounded, thread-safe cache of [`Matcher`] values keyed by pattern and timeout.
///
/// Share one cache between validators with [`crate::ValidationOptions::with_pattern_cache`].
#[derive(Debug)]
pub struct PatternCache {
    capacity: usize,
    entries: RwLock<AHashMap<PatternKey, Arc<CacheEntry>>>,
    bookkeeping: Mutex<Bookkeeping>,
    last: RwLock<Option<Arc<CacheEntry>>>,
}

impl Default for PatternCache {
    fn default() -> Self {
        PatternCache::new(DEFAULT_CAPACITY)
    }
}

impl PatternCache {
    /// Create a cache holding at most `capacity` matchers. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> PatternCache {
        PatternCache {
            capacity: capacity.max(1),
            entries: RwLock::new(AHashMap::with_capacity(capacity)),
            bookkeeping: Mutex::new(Bookkeeping::default()),
            last: RwLock::new(None),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the matcher for `pattern`, creating it when it is not cached.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidPattern`] when a new matcher cannot be created.
    pub fn get(&self, pattern: &str, timeout: Duration) -> Result<Arc<Matcher>, SchemaError> {
        if let Some(entry) = self.last.read().as_ref() {
            if entry.is(pattern, timeout) {
                return Ok(entry.hit());
            }
        }
        let key = PatternKey {
            pattern: pattern.to_string(),
            timeout,
        };
        if let Some(entry) = self.entries.read().get(&key) {
            *self.last.write() = Some(Arc::clone(entry));
            return Ok(entry.hit());
        }
        let matcher = Arc::new(Matcher::new(pattern, timeout)?);
        Ok(self.insert(key, matcher))
    }

    fn insert(&self, key: PatternKey, matcher: Arc<Matcher>) -> Arc<Matcher> {
        let mut bookkeeping = self.bookkeeping.lock();
        let mut entries = self.entries.write();
        // Another thread may have inserted the same key while the matcher was being built
        if let Some(entry) = entries.get(&key) {
            return entry.hit();
        }
        if entries.len() >= self.capacity {
            if let Some(victim) = Self::select_victim(&mut bookkeeping) {
                let evicted = bookkeeping.slots.swap_remove(victim);
                entries.remove(&evicted.key);
                let mut last = self.last.write();
                if last.as_ref().is_some_and(|entry| Arc::ptr_eq(entry, &evicted)) {
                    *last = None;
                }
                tracing::trace!(pattern = %evicted.key.pattern, "Evicted pattern matcher");
            }
        }
        let entry = Arc::new(CacheEntry {
            key: key.clone(),
            matcher,
            hits: AtomicU64::new(1),
        });
        bookkeeping.slots.push(Arc::clone(&entry));
        entries.insert(key, Arc::clone(&entry));
        *self.last.write() = Some(Arc::clone(&entry));
        Arc::clone(&entry.matcher)
    }

    fn select_victim(bookkeeping: &mut Bookkeeping) -> Option<usize> {
        let len = bookkeeping.slots.len();
        if len == 0 {
            return None;
        }
        let start = bookkeeping.window_start % len;
        let window = EVICTION_WINDOW.min(len);
        let victim = (0..window)
            .map(|offset| (start + offset) % len)
            .min_by_key(|&idx| bookkeeping.slots[idx].hits.load(Ordering::Relaxed))?;
        bookkeeping.window_start = (start + window) % len;
        Some(victim)
    }
}
