use std::cmp::Ordering;

use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};

use crate::{compiler, error::SchemaError};

macro_rules! num_cmp {
    ($left:expr, $right:expr) => {
        if let Some(b) = $right.as_u64() {
            NumCmp::num_eq($left, b)
        } else if let Some(b) = $right.as_i64() {
            NumCmp::num_eq($left, b)
        } else {
            $right.as_f64().is_some_and(|b| NumCmp::num_eq($left, b))
        }
    };
}

/// Deep JSON equality where numbers compare by value, so `1` equals `1.0`.
#[inline]
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => {
            if let Some(a) = left.as_u64() {
                num_cmp!(a, right)
            } else if let Some(a) = left.as_i64() {
                num_cmp!(a, right)
            } else if let Some(a) = left.as_f64() {
                num_cmp!(a, right)
            } else {
                false
            }
        }
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

#[inline]
pub(crate) fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(a, b)| equal(a, b))
}

#[inline]
pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| equal(value, other)))
}

/// A numeric bound kept in its most precise representation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Limit {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl Limit {
    pub(crate) fn compile(
        ctx: &compiler::Context<'_>,
        keyword: &'static str,
        value: &Value,
    ) -> Result<Limit, SchemaError> {
        let Value::Number(number) = value else {
            return Err(ctx.invalid(keyword, "expected a number"));
        };
        if let Some(limit) = number.as_u64() {
            Ok(Limit::Unsigned(limit))
        } else if let Some(limit) = number.as_i64() {
            Ok(Limit::Signed(limit))
        } else {
            number
                .as_f64()
                .map(Limit::Float)
                .ok_or_else(|| ctx.invalid(keyword, "expected a finite number"))
        }
    }

    /// How `item` orders against this bound.
    pub(crate) fn compare(self, item: &Number) -> Option<Ordering> {
        macro_rules! against {
            ($item:expr) => {
                match self {
                    Limit::Unsigned(limit) => NumCmp::num_cmp($item, limit),
                    Limit::Signed(limit) => NumCmp::num_cmp($item, limit),
                    Limit::Float(limit) => NumCmp::num_cmp($item, limit),
                }
            };
        }
        if let Some(item) = item.as_u64() {
            against!(item)
        } else if let Some(item) = item.as_i64() {
            against!(item)
        } else {
            item.as_f64().and_then(|item| against!(item))
        }
    }
}

/// Read a non-negative integer bound. Integral floats such as `2.0` are accepted.
pub(crate) fn non_negative_integer(
    ctx: &compiler::Context<'_>,
    keyword: &'static str,
    value: &Value,
) -> Result<u64, SchemaError> {
    if let Some(limit) = value.as_u64() {
        return Ok(limit);
    }
    if let Some(limit) = value.as_f64() {
        if limit >= 0. && limit.trunc() == limit {
            // NOTE: Imprecise cast as big integers are not supported
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            return Ok(limit as u64);
        }
    }
    Err(ctx.invalid(keyword, "expected a non-negative integer"))
}

/// Read an array of unique strings, as used by `required` and `dependentRequired`.
pub(crate) fn string_array(
    ctx: &compiler::Context<'_>,
    keyword: &'static str,
    value: &Value,
) -> Result<Vec<String>, SchemaError> {
    let Value::Array(items) = value else {
        return Err(ctx.invalid(keyword, "expected an array of strings"));
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ctx.invalid(keyword, "expected an array of strings"))
        })
        .collect()
}
