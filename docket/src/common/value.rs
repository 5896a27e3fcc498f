use crate::collection::{Document, DocumentId};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use chrono::{DateTime, SecondsFormat, Utc};
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Compare two floats with NaN treated as greater than every other value.
#[inline]
fn num_cmp_float(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// Represents a [Document] value.
///
/// Numbers compare across the integer and float variants (`I64(10) == F64(10.0)`).
/// Values of different types order by type rank:
/// `Null < Bool < number < String < Timestamp < Document < Array`, which makes
/// a missing field (read back as [Value::Null]) the minimum of every type.
///
/// ```text
/// let v1: Value = 42.into();
/// let v2 = Value::from("hello");
/// let v3 = val!(true);
/// ```
#[derive(Clone, Default, serde::Deserialize, serde::Serialize)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    Bool(bool),
    /// All integer inputs are widened to `i64`.
    I64(i64),
    F64(f64),
    String(String),
    /// A UTC instant.
    Timestamp(DateTime<Utc>),
    /// A nested document.
    Document(Document),
    /// An ordered list of values.
    Array(Vec<Value>),
}

impl Value {
    /// Converts any supported type into a [Value].
    pub fn from<T: Into<Value>>(value: T) -> Value {
        value.into()
    }

    pub fn from_vec<T: Into<Value>>(values: Vec<T>) -> Value {
        Value::Array(values.into_iter().map(Into::into).collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the numeric value as `f64` for both number variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I64(i) => Some(*i as f64),
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_string().map(|s| s.as_str())
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::I64(_))
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, Value::F64(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::I64(_) | Value::F64(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, Value::Timestamp(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Whether two values belong to the same comparison bracket, so that a
    /// range comparison between them is meaningful.
    pub fn is_comparable_with(&self, other: &Value) -> bool {
        self.type_rank() == other.type_rank()
    }

    /// The type name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "integer",
            Value::F64(_) => "float",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Document(_) => "document",
            Value::Array(_) => "array",
        }
    }

    /// Moves the value out, leaving [Value::Null] behind.
    pub fn take(&mut self) -> Value {
        std::mem::replace(self, Value::Null)
    }

    /// Adds two numbers. Integer addition stays integral and fails on overflow.
    pub fn checked_add(&self, other: &Value) -> DocketResult<Value> {
        match (self, other) {
            (Value::I64(a), Value::I64(b)) => a.checked_add(*b).map(Value::I64).ok_or_else(|| {
                log::error!("Integer overflow adding {} and {}", a, b);
                DocketError::new("Integer overflow", ErrorKind::InvalidOperation)
            }),
            (a, b) if a.is_number() && b.is_number() => {
                let sum = a.as_f64().unwrap_or_default() + b.as_f64().unwrap_or_default();
                Ok(Value::F64(sum))
            }
            _ => {
                log::error!("Cannot add non numeric values {} and {}", self, other);
                Err(DocketError::new(
                    &format!("Cannot add {} to {}", other.type_name(), self.type_name()),
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::I64(_) | Value::F64(_) => 2,
            Value::String(_) => 3,
            Value::Timestamp(_) => 4,
            Value::Document(_) => 5,
            Value::Array(_) => 6,
        }
    }

    /// Converts into a `serde_json::Value`. Timestamps become RFC 3339 strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::I64(i) => serde_json::Value::from(*i),
            Value::F64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Document(d) => d.to_json(),
            Value::Array(a) => serde_json::Value::Array(a.iter().map(Value::to_json).collect()),
        }
    }

    /// Converts from a `serde_json::Value`. Strings stay strings; use a schema
    /// with [`crate::validation::FieldType::Timestamp`] to coerce timestamps.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::I64(i),
                None => Value::F64(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(a) => Value::Array(a.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => {
                let mut doc = Document::new();
                for (key, value) in map {
                    doc.put_raw(key, Value::from_json(value));
                }
                Value::Document(doc)
            }
        }
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::String(v) => format!("\"{}\"", v),
            Value::Timestamp(v) => format!("\"{}\"", v.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Document(v) => v.to_pretty_json(indent),
            Value::Array(v) => {
                if v.is_empty() {
                    return "[]".to_string();
                }

                let mut json_str = String::new();
                json_str.push_str("[\n");
                let indent_str = " ".repeat(indent + 2);
                for value in v {
                    json_str.push_str(&format!(
                        "{}{},\n",
                        indent_str,
                        value.to_pretty_json(indent + 2)
                    ));
                }
                json_str.pop(); // remove last newline
                json_str.pop(); // remove last comma
                json_str.push_str(&format!("\n{}]", " ".repeat(indent)));
                json_str
            }
        }
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(v) => format!("bool({})", v),
            Value::I64(v) => format!("i64({})", v),
            Value::F64(v) => format!("f64({})", v),
            Value::String(v) => format!("string(\"{}\")", v),
            Value::Timestamp(v) => format!("timestamp({})", v.to_rfc3339()),
            Value::Document(v) => format!("object({})", v.to_debug_string(indent)),
            Value::Array(v) => {
                let items = v
                    .iter()
                    .map(|it| it.to_debug_string(indent + 2))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("array([{}])", items)
            }
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I64(a), Value::I64(b)) => a == b,
            (a, b) if a.is_number() && b.is_number() => num_eq_float(
                a.as_f64().unwrap_or_default(),
                b.as_f64().unwrap_or_default(),
            ),
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::I64(a), Value::I64(b)) => a.cmp(b),
            (a, b) if a.is_number() && b.is_number() => num_cmp_float(
                a.as_f64().unwrap_or_default(),
                b.as_f64().unwrap_or_default(),
            ),
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Document(a), Value::Document(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            // integers and floats that compare equal must hash equal
            Value::I64(i) => (*i as f64).to_bits().hash(state),
            Value::F64(f) => {
                let normalized = if *f == 0.0 {
                    0.0f64
                } else if f.is_nan() {
                    f64::NAN
                } else {
                    *f
                };
                normalized.to_bits().hash(state)
            }
            Value::String(s) => s.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Document(d) => d.hash(state),
            Value::Array(a) => a.hash(state),
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
        Value::I64(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::I64(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Value::I64)
            .unwrap_or(Value::F64(value as f64))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<DocumentId> for Value {
    fn from(value: DocumentId) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&DocumentId> for Value {
    fn from(value: &DocumentId) -> Self {
        Value::String(value.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

/// A macro to create a `Value` from a given expression.
///
/// ```rust
/// use docket::common::Value;
/// use docket::val;
///
/// assert_eq!(val!(42), Value::I64(42));
/// assert_eq!(val!("hello"), Value::String("hello".to_string()));
/// ```
#[macro_export]
macro_rules! val {
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use chrono::TimeZone;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn integers_and_floats_compare_across_variants() {
        assert_eq!(Value::I64(10), Value::F64(10.0));
        assert!(Value::I64(3) < Value::F64(3.5));
        assert!(Value::F64(-1.0) < Value::I64(0));
        assert_eq!(hash_of(&Value::I64(10)), hash_of(&Value::F64(10.0)));
    }

    #[test]
    fn null_is_the_minimum_of_every_type() {
        assert!(Value::Null < Value::Bool(false));
        assert!(Value::Null < Value::I64(i64::MIN));
        assert!(Value::Null < Value::String(String::new()));
        assert!(Value::Null < Value::Timestamp(Utc.timestamp_opt(0, 0).unwrap()));
        assert!(Value::Null < Value::Array(vec![]));
    }

    #[test]
    fn type_rank_orders_mixed_values() {
        assert!(Value::Bool(true) < Value::I64(0));
        assert!(Value::I64(1_000) < Value::String("a".into()));
        assert!(Value::String("z".into()) < Value::Timestamp(Utc::now()));
    }

    #[test]
    fn nan_sorts_after_numbers() {
        assert!(Value::F64(f64::NAN) > Value::F64(f64::MAX));
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
    }

    #[test]
    fn from_conversions_widen_integers() {
        assert_eq!(Value::from(5i32), Value::I64(5));
        assert_eq!(Value::from(5u32), Value::I64(5));
        assert_eq!(Value::from(5usize), Value::I64(5));
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(vec![1, 2]), Value::Array(vec![Value::I64(1), Value::I64(2)]));
    }

    #[test]
    fn checked_add_keeps_integers_integral() {
        assert_eq!(Value::I64(2).checked_add(&Value::I64(3)).unwrap(), Value::I64(5));
        assert!(Value::I64(2).checked_add(&Value::F64(0.5)).unwrap().is_decimal());
        assert_eq!(
            Value::I64(i64::MAX).checked_add(&Value::I64(1)).unwrap_err().kind(),
            &ErrorKind::InvalidOperation
        );
        assert!(Value::String("a".into()).checked_add(&Value::I64(1)).is_err());
    }

    #[test]
    fn is_comparable_with_uses_type_brackets() {
        assert!(Value::I64(1).is_comparable_with(&Value::F64(2.0)));
        assert!(!Value::I64(1).is_comparable_with(&Value::String("1".into())));
    }

    #[test]
    fn json_round_trip_of_nested_values() {
        let doc = doc! { name: "Widget", price: 10, tags: ["a", "b"], dims: { w: 1.5 } };
        let json = Value::Document(doc.clone()).to_json();
        assert_eq!(json["name"], serde_json::json!("Widget"));
        assert_eq!(json["dims"]["w"], serde_json::json!(1.5));
        assert_eq!(Value::from_json(&json), Value::Document(doc));
    }

    #[test]
    fn timestamp_renders_as_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Value::Timestamp(ts).to_json(), serde_json::json!("2024-01-02T03:04:05.000Z"));
    }

    #[test]
    fn val_macro_creates_values() {
        assert_eq!(val!(true), Value::Bool(true));
        assert_eq!(val!(1.5), Value::F64(1.5));
    }
}
