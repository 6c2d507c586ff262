use std::{sync::Arc, thread, time::Duration};

use schemascope::{OutputMode, PatternCache};
use serde_json::json;

const TIMEOUT: Duration = Duration::from_millis(100);

#[test]
fn bound_is_never_exceeded() {
    let cache = PatternCache::new(4);
    for idx in 0..50 {
        let pattern = format!("^item-{idx}$");
        let matcher = cache.get(&pattern, TIMEOUT).expect("Valid pattern");
        assert_eq!(matcher.is_match(&format!("item-{idx}")), Ok(true));
        assert!(cache.len() <= cache.capacity());
    }
    // Evicted entries are recreated on demand
    let matcher = cache.get("^item-0$", TIMEOUT).expect("Valid pattern");
    assert_eq!(matcher.is_match("item-0"), Ok(true));
    assert_eq!(cache.len(), 4);
}

#[test]
fn documents_share_a_cache() {
    let cache = Arc::new(PatternCache::new(8));
    let first = schemascope::options()
        .with_pattern_cache(Arc::clone(&cache))
        .build(&json!({"pattern": "^a+$"}))
        .expect("Valid schema");
    let second = schemascope::options()
        .with_pattern_cache(Arc::clone(&cache))
        .build(&json!({"propertyNames": {"pattern": "^a+$"}}))
        .expect("Valid schema");
    assert!(first.is_valid(&json!("aaa")).expect("No faults"));
    assert!(!second.is_valid(&json!({"b": 1})).expect("No faults"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn concurrent_validation() {
    let cache = Arc::new(PatternCache::new(3));
    let document = Arc::new(
        schemascope::options()
            .with_pattern_cache(Arc::clone(&cache))
            .build(&json!({
                "patternProperties": {
                    "^a": {"pattern": "^[0-9]+$"},
                    "^b": {"pattern": "^[a-z]+$"},
                    "^c": {"pattern": "^[A-Z]+$"},
                    "^d": {"pattern": "^-[0-9]+$"}
                }
            }))
            .expect("Valid schema"),
    );
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let document = Arc::clone(&document);
            thread::spawn(move || {
                for round in 0..200 {
                    let valid = json!({"a1": "123", "b1": "abc", "c1": "XYZ", "d1": "-4"});
                    let invalid = json!({"a1": "x", "b1": "1", "c1": "x", "d1": "4"});
                    assert!(document.is_valid(&valid).expect("No faults"));
                    let outcome = document
                        .validate_value(&invalid, OutputMode::List)
                        .expect("No faults");
                    assert_eq!(outcome.errors().len(), 4, "worker {worker}, round {round}");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Worker panicked");
    }
    assert!(cache.len() <= 3);
}

#[test]
fn hot_patterns_are_promoted() {
    let cache = PatternCache::new(2);
    let matcher = cache.get("^x", TIMEOUT).expect("Valid pattern");
    assert!(!matcher.is_compiled());
    for _ in 0..200 {
        assert_eq!(matcher.is_match("xyz"), Ok(true));
    }
    assert!(matcher.is_compiled());
}
