use std::fmt;

use serde::{Serialize, Serializer};

/// Compare two doubles the way the wire protocol sees them.
///
/// Values are equal only if they are numerically equal *and* have the same bit pattern, so
/// `-0.0` and `0.0` differ, and `NaN` is never equal to anything, including itself.
pub fn double_eq(a: f64, b: f64) -> bool {
    a == b && a.to_bits() == b.to_bits()
}

/// An ordered document, as returned by a backend.
///
/// Field order is significant and preserved. Duplicate keys are kept as-is because some backends
/// return them and they must show up in a comparison.
#[derive(Debug, Clone, Default)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

/// A single value inside a [Document].
///
/// There is deliberately no numeric coercion between variants: an `Int32(1)` is not equal to a
/// `Double(1.0)`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Document(Document),
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style append.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((key.into(), value.into()));
    }

    /// The first value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a document from a JSON object, decoding Extended JSON number wrappers.
    ///
    /// Returns `None` if the JSON value is not an object.
    pub fn from_json(json: serde_json::Value) -> Option<Self> {
        match Value::from_json(json) {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Canonical Extended JSON, so that values like `NaN` and `-0.0` survive serialization.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Value {
    /// Convert a JSON value, decoding `$numberDouble`, `$numberInt` and `$numberLong` wrappers.
    ///
    /// Plain JSON integers become `Int32` when they fit and `Int64` otherwise. Other numbers
    /// become `Double`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i32::try_from(i).map_or(Value::Int64(i), Value::Int32)
                } else {
                    Value::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                if map.len() == 1 {
                    if let Some((key, serde_json::Value::String(raw))) = map.iter().next() {
                        if let Some(value) = decode_number_wrapper(key, raw) {
                            return value;
                        }
                    }
                }

                Value::Document(Document {
                    fields: map
                        .into_iter()
                        .map(|(k, v)| (k, Value::from_json(v)))
                        .collect(),
                })
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int32(i) => serde_json::Value::from(*i),
            Value::Int64(i) => serde_json::json!({ "$numberLong": i.to_string() }),
            Value::Double(d) => {
                let plain = d.is_finite() && !(*d == 0.0 && d.is_sign_negative());
                match serde_json::Number::from_f64(*d) {
                    Some(n) if plain => serde_json::Value::Number(n),
                    _ => serde_json::json!({ "$numberDouble": encode_double(*d) }),
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Document(doc) => doc.to_json(),
        }
    }

    /// A short name for the value's type, used in mismatch reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int",
            Value::Int64(_) => "long",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Document(_) => "object",
        }
    }
}

fn decode_number_wrapper(key: &str, raw: &str) -> Option<Value> {
    match key {
        "$numberDouble" => match raw {
            "NaN" => Some(Value::Double(f64::NAN)),
            "Infinity" => Some(Value::Double(f64::INFINITY)),
            "-Infinity" => Some(Value::Double(f64::NEG_INFINITY)),
            _ => raw.parse::<f64>().ok().map(Value::Double),
        },
        "$numberInt" => raw.parse::<i32>().ok().map(Value::Int32),
        "$numberLong" => raw.parse::<i64>().ok().map(Value::Int64),
        _ => None,
    }
}

fn encode_double(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_string()
    } else if d == f64::INFINITY {
        "Infinity".to_string()
    } else if d == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{d:?}")
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => double_eq(*a, *b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Shell-like rendering, e.g. `{ _id: "1", foo: -0.0 }`.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "{{}}");
        }

        write!(f, "{{ ")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int32(i) => write!(f, "{i}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                write!(f, "[ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, " ]")
            }
            Value::Document(doc) => write!(f, "{doc}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn negative_zero_is_not_zero() {
        assert!(!double_eq(-0.0, 0.0));
        assert!(double_eq(-0.0, -0.0));
        assert!(double_eq(1.5, 1.5));
    }

    #[test]
    fn nan_is_never_equal() {
        assert!(!double_eq(f64::NAN, f64::NAN));

        let doc = Document::new().with("foo", f64::NAN);
        assert!(doc != doc.clone());
    }

    #[test]
    fn field_order_is_significant() {
        let a = Document::new().with("a", 1).with("b", 2);
        let b = Document::new().with("b", 2).with("a", 1);
        assert!(a != b);
    }

    #[test]
    fn int_and_double_are_distinct() {
        assert!(Value::Int32(1) != Value::Double(1.0));
        assert!(Value::Int32(1) != Value::Int64(1));
    }

    #[test]
    fn decode_extended_json_doubles() {
        let json = serde_json::json!({
            "_id": "1",
            "nan": { "$numberDouble": "NaN" },
            "neg_zero": { "$numberDouble": "-0.0" },
            "inf": { "$numberDouble": "Infinity" },
            "long": { "$numberLong": "42" },
        });

        let doc = Document::from_json(json).expect("should be a document");

        assert!(matches!(doc.get("nan"), Some(Value::Double(d)) if d.is_nan()));
        assert!(
            matches!(doc.get("neg_zero"), Some(Value::Double(d)) if *d == 0.0 && d.is_sign_negative())
        );
        assert!(matches!(doc.get("inf"), Some(Value::Double(d)) if *d == f64::INFINITY));
        assert!(matches!(doc.get("long"), Some(Value::Int64(42))));
        let keys = doc.iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(vec!["_id", "nan", "neg_zero", "inf", "long"], keys);
    }

    #[test]
    fn non_object_is_not_a_document() {
        assert!(Document::from_json(serde_json::json!([1, 2])).is_none());
    }

    #[test]
    fn special_doubles_survive_encoding() {
        let doc = Document::new()
            .with("v", -0.0)
            .with("w", f64::NAN)
            .with("x", 2.5);

        assert_eq!(
            serde_json::json!({
                "v": { "$numberDouble": "-0.0" },
                "w": { "$numberDouble": "NaN" },
                "x": 2.5,
            }),
            doc.to_json()
        );
    }

    #[test]
    fn display_like_the_shell() {
        let doc = Document::new()
            .with("_id", "1")
            .with("foo", -0.0)
            .with("bar", Value::Array(vec![Value::Int32(1), Value::Null]));

        assert_eq!(r#"{ _id: "1", foo: -0.0, bar: [ 1, null ] }"#, doc.to_string());
    }
}
