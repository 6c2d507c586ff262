//! JSON primitive types as named by the `type` keyword.
use serde_json::Value;
use std::{fmt, ops::BitOrAssign};

/// A JSON type name accepted by the `type` keyword.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl PrimitiveType {
    const ALL: [PrimitiveType; 7] = [
        PrimitiveType::Array,
        PrimitiveType::Boolean,
        PrimitiveType::Integer,
        PrimitiveType::Null,
        PrimitiveType::Number,
        PrimitiveType::Object,
        PrimitiveType::String,
    ];

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "array" => Some(PrimitiveType::Array),
            "boolean" => Some(PrimitiveType::Boolean),
            "integer" => Some(PrimitiveType::Integer),
            "null" => Some(PrimitiveType::Null),
            "number" => Some(PrimitiveType::Number),
            "object" => Some(PrimitiveType::Object),
            "string" => Some(PrimitiveType::String),
            _ => None,
        }
    }

    /// Whether `instance` belongs to this type.
    ///
    /// Numbers with a zero fractional part count as integers, so `1.0` is an `integer`.
    pub fn matches(self, instance: &Value) -> bool {
        match (self, instance) {
            (PrimitiveType::Array, Value::Array(_))
            | (PrimitiveType::Boolean, Value::Bool(_))
            | (PrimitiveType::Null, Value::Null)
            | (PrimitiveType::Number, Value::Number(_))
            | (PrimitiveType::Object, Value::Object(_))
            | (PrimitiveType::String, Value::String(_)) => true,
            (PrimitiveType::Integer, Value::Number(number)) => {
                number.is_u64()
                    || number.is_i64()
                    || number.as_f64().is_some_and(|value| value.fract() == 0.)
            }
            _ => false,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            PrimitiveType::Array => 1,
            PrimitiveType::Boolean => 2,
            PrimitiveType::Integer => 4,
            PrimitiveType::Null => 8,
            PrimitiveType::Number => 16,
            PrimitiveType::Object => 32,
            PrimitiveType::String => 64,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveType::Array => "array",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Null => "null",
            PrimitiveType::Number => "number",
            PrimitiveType::Object => "object",
            PrimitiveType::String => "string",
        })
    }
}

/// Compact set of [`PrimitiveType`] values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimitiveTypes {
    inner: u8,
}

impl PrimitiveTypes {
    pub(crate) const fn new() -> Self {
        Self { inner: 0 }
    }

    pub(crate) const fn contains(self, primitive_type: PrimitiveType) -> bool {
        self.inner & primitive_type.bit() != 0
    }

    pub(crate) fn matches(self, instance: &Value) -> bool {
        self.iter().any(|primitive_type| primitive_type.matches(instance))
    }

    /// Iterate over the contained types in a stable order.
    pub fn iter(self) -> impl Iterator<Item = PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .filter(move |primitive_type| self.contains(*primitive_type))
    }
}

impl BitOrAssign<PrimitiveType> for PrimitiveTypes {
    #[inline]
    fn bitor_assign(&mut self, rhs: PrimitiveType) {
        self.inner |= rhs.bit();
    }
}

impl fmt::Display for PrimitiveTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for primitive_type in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "\"{primitive_type}\"")?;
            first = false;
        }
        Ok(())
    }
}
