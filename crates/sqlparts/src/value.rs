//! Dialect-neutral bound values.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A value bound to a placeholder.
///
/// Values are owned and cheap to clone so a compiled statement can be moved
/// across tasks and handed to any driver. Serialization is untagged: JSON
/// scalars and arrays map onto the matching variants, and strings shaped
/// like a UUID, a `YYYY-MM-DD` date or an RFC 3339 timestamp deserialize
/// into those variants before falling back to `Text`.
///
/// So `Text("2025-01-01")` reads back from JSON as `Date`, and a UUID-shaped
/// `Text` as `Uuid`. The Postgres binding renders such values as text again
/// when the parameter is a text column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// `true` for values that carry nothing to compare against.
    ///
    /// Predicates holding such a value are dropped by the compilers.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::from(0i64).is_empty());
        assert!(!Value::from(false).is_empty());
        assert!(!Value::from("x").is_empty());
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i32)), Value::Int(7));
    }

    #[test]
    fn shaped_strings_read_back_as_typed_values() {
        let text = Value::from("2025-01-01");
        let json = serde_json::to_string(&text).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));

        let back: Value = serde_json::from_str(r#""60601fee-2bf1-4721-ae6f-7636e79a0cba""#).unwrap();
        assert!(matches!(back, Value::Uuid(_)));

        let back: Value = serde_json::from_str(r#""Netflix""#).unwrap();
        assert_eq!(back, Value::from("Netflix"));
    }

    #[test]
    fn json_is_untagged() {
        let v: Vec<Value> = serde_json::from_str(r#"[null, true, 10, 1.5, "a", [1, 2]]"#).unwrap();
        assert_eq!(
            v,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(10),
                Value::Float(1.5),
                Value::Text("a".into()),
                Value::List(vec![Value::Int(1), Value::Int(2)]),
            ]
        );
        assert_eq!(serde_json::to_string(&Value::Int(3)).unwrap(), "3");
    }
}
