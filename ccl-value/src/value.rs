use std::fmt;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The dynamic value stored in a single table cell.
///
/// `Value` has no notion of a column schema: a column is simply an ordered
/// sequence of these, and any two cells in the same column may carry
/// different kinds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// Absence of a value, distinct from `Float(NaN)`.
    Null,
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit float, including `NaN`.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
    /// An instant in time, stored and displayed in UTC.
    Timestamp(DateTime<Utc>),
    /// A nested ordered sequence of values, produced only as the result of a
    /// CCL range expression (`A:B`, `A.0:2`, ...). Never stored in a column.
    Seq(Vec<Value>),
}

impl Value {
    /// A short, stable name for the value's kind, used in warning messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Seq(_) => "seq",
        }
    }

    /// `true` for `Null` and for `Float(NaN)` — the two ways a cell can be
    /// "missing" in this engine.
    pub fn is_nil_or_nan(&self) -> bool {
        matches!(self, Value::Null) || matches!(self, Value::Float(f) if f.is_nan())
    }

    /// `true` for `Null` only.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for `Float(NaN)` only.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    /// Truthiness as used by `IF`, `AND`, `OR`: a non-zero number, a
    /// non-empty string, or `true` are truthy; everything else is falsy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => !f.is_nan() && *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            Value::Timestamp(_) => true,
            Value::Seq(s) => !s.is_empty(),
        }
    }

    /// Equality used by `drop_all`, `replace_*` and friends: `NaN` compares
    /// equal only to `NaN`, everything else compares structurally.
    pub fn eq_nan_aware(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) if a.is_nan() && b.is_nan() => true,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Seq(a), Value::Seq(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.eq_nan_aware(b))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(""),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_eq_nan() {
        assert!(Value::Float(f64::NAN).eq_nan_aware(&Value::Float(f64::NAN)));
        assert!(!Value::Float(f64::NAN).eq_nan_aware(&Value::Float(1.0)));
    }

    #[test]
    fn truthiness() {
        assert!(Value::Int(1).truthy());
        assert!(!Value::Int(0).truthy());
        assert!(!Value::String(String::new()).truthy());
        assert!(Value::String("x".into()).truthy());
        assert!(!Value::Null.truthy());
    }

    #[test]
    fn display_matches_canonical_stringification() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::Null.to_string(), "");
    }
}
