use std::hash::{Hash, Hasher};

use ahash::{AHashMap, AHasher};
use serde_json::{Map, Value};

use crate::{
    compiler,
    context::ValidationContext,
    error::ValidationErrorKind,
    keywords::{helpers::equal, CompilationResult},
    output::{Evaluation, EvaluationResult},
    paths::LazyLocation,
    validator::Validate,
};

/// Hashes consistently with [`equal`], so `1` and `1.0` land in the same bucket.
pub(crate) struct HashedValue<'a>(&'a Value);

impl PartialEq for HashedValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        equal(self.0, other.0)
    }
}

impl Eq for HashedValue<'_> {}

impl Hash for HashedValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Value::Null => state.write_u32(3_221_225_473),
            Value::Bool(item) => item.hash(state),
            Value::Number(item) => {
                // Big integers may share a bucket with a nearby float, `equal` tells them apart
                let number = item.as_f64().unwrap_or_default();
                if number == 0. {
                    0_u64.hash(state);
                } else {
                    number.to_bits().hash(state);
                }
            }
            Value::String(item) => item.hash(state),
            Value::Array(items) => {
                for item in items {
                    HashedValue(item).hash(state);
                }
            }
            Value::Object(items) => {
                let mut hash = 0;
                for (key, value) in items {
                    let mut item_hasher = AHasher::default();
                    key.hash(&mut item_hasher);
                    HashedValue(value).hash(&mut item_hasher);
                    hash ^= item_hasher.finish();
                }
                state.write_u64(hash);
            }
        }
    }
}

// Below this size pairwise comparison beats hashing
const ITEMS_SIZE_THRESHOLD: usize = 15;

/// Indices of the first pair of equal items, if any.
pub(crate) fn find_duplicate(items: &[Value]) -> Option<(usize, usize)> {
    if items.len() <= ITEMS_SIZE_THRESHOLD {
        for (idx, item) in items.iter().enumerate() {
            for (offset, other) in items[idx + 1..].iter().enumerate() {
                if equal(item, other) {
                    return Some((idx, idx + 1 + offset));
                }
            }
        }
        None
    } else {
        // Same pair as the pairwise scan: the lowest first index, then its earliest repeat
        let mut seen = AHashMap::with_capacity(items.len());
        let mut pair: Option<(usize, usize)> = None;
        for (idx, item) in items.iter().enumerate() {
            let first = *seen.entry(HashedValue(item)).or_insert(idx);
            if first != idx && pair.map_or(true, |(best, _)| first < best) {
                if first == 0 {
                    return Some((0, idx));
                }
                pair = Some((first, idx));
            }
        }
        pair
    }
}

pub(crate) struct UniqueItemsValidator;

impl Validate for UniqueItemsValidator {
    fn evaluate<'s, 'i>(
        &'s self,
        instance: &'i Value,
        location: &LazyLocation,
        ctx: &mut ValidationContext<'s>,
    ) -> EvaluationResult<'i> {
        if let Value::Array(items) = instance {
            if let Some((first, second)) = find_duplicate(items) {
                return Ok(ctx
                    .error(
                        instance,
                        location,
                        ValidationErrorKind::UniqueItems { first, second },
                    )
                    .into());
            }
        }
        Ok(Evaluation::Valid)
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &mut compiler::Context<'_>,
    _: &Map<String, Value>,
    schema: &Value,
) -> Option<CompilationResult> {
    match schema {
        Value::Bool(true) => Some(Ok(Box::new(UniqueItemsValidator))),
        Value::Bool(false) => None,
        _ => Some(Err(ctx.invalid("uniqueItems", "expected a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::find_duplicate;
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!([]))]
    #[test_case(&json!([1, "1", [1], {"a": 1}]))]
    #[test_case(&json!([0, false]))]
    #[test_case(&json!([{"a": 1}, {"a": 2}]))]
    #[test_case(&json!((0..40).collect::<Vec<_>>()); "hashed path")]
    fn is_valid(instance: &Value) {
        tests_util::is_valid(&json!({"uniqueItems": true}), instance);
    }

    #[test_case(&json!([1, 1.0]))]
    #[test_case(&json!([{"a": [1]}, {"a": [1.0]}]))]
    #[test_case(&json!([0.0, -0.0]))]
    fn is_not_valid(instance: &Value) {
        tests_util::is_not_valid(&json!({"uniqueItems": true}), instance);
    }

    #[test]
    fn disabled() {
        tests_util::is_valid(&json!({"uniqueItems": false}), &json!([1, 1]));
    }

    #[test]
    fn reports_first_pair() {
        assert_eq!(find_duplicate(&[json!(1), json!(2), json!(3), json!(2)]), Some((1, 3)));
        let mut large: Vec<Value> = (0..30).map(|idx| json!(idx)).collect();
        large.push(json!(7.0));
        assert_eq!(find_duplicate(&large), Some((7, 30)));
    }

    #[test]
    fn same_pair_on_both_sides_of_the_threshold() {
        let prefix = [json!(0), json!(1), json!(1), json!(0)];
        assert_eq!(find_duplicate(&prefix), Some((0, 3)));
        let mut padded = prefix.to_vec();
        padded.extend((100..116).map(|idx| json!(idx)));
        assert!(padded.len() > super::ITEMS_SIZE_THRESHOLD);
        assert_eq!(find_duplicate(&padded), Some((0, 3)));
        let mut shifted = vec![json!("a"), json!(5), json!(6), json!(6), json!(5)];
        shifted.extend((100..116).map(|idx| json!(idx)));
        assert_eq!(find_duplicate(&shifted), Some((1, 4)));
    }

    #[test]
    fn message() {
        tests_util::expect_errors(
            &json!({"uniqueItems": true}),
            &json!([1, 1]),
            &["[1,1] has non-unique elements (items 0 and 1 are equal)"],
        );
    }
}
