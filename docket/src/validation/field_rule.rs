use crate::errors::{DocketError, ErrorKind};
use crate::validation::{Schema, Violation};
use crate::{Value, FIELD_SEPARATOR};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use regex::Regex;
use std::fmt::Display;
use std::sync::Arc;

/// The type a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    /// Any number; integers are accepted where a float is expected.
    Float,
    Number,
    Bool,
    /// A timestamp value, or a string in RFC 3339 format which is converted.
    Timestamp,
    Document,
    Array,
    Any,
}

impl FieldType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_integer(),
            FieldType::Float | FieldType::Number => value.is_number(),
            FieldType::Bool => value.is_bool(),
            FieldType::Timestamp => value.is_timestamp() || parse_timestamp(value).is_some(),
            FieldType::Document => value.is_document(),
            FieldType::Array => value.is_array(),
            FieldType::Any => true,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Timestamp => "timestamp",
            FieldType::Document => "document",
            FieldType::Array => "array",
            FieldType::Any => "any",
        };
        write!(f, "{}", name)
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Constraints on a single field.
///
/// Rules are built fluently from a type constructor. A malformed rule (for
/// example an invalid pattern) is reported when the schema is handed to
/// [`crate::validation::Validator::new`].
#[derive(Clone)]
pub struct FieldRule {
    field_type: FieldType,
    required: bool,
    gt: Option<Value>,
    gte: Option<Value>,
    lt: Option<Value>,
    lte: Option<Value>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    one_of: Vec<Value>,
    min_items: Option<usize>,
    max_items: Option<usize>,
    items: Option<Arc<FieldRule>>,
    schema: Option<Arc<Schema>>,
    error: Option<DocketError>,
}

impl FieldRule {
    pub fn new(field_type: FieldType) -> Self {
        FieldRule {
            field_type,
            required: false,
            gt: None,
            gte: None,
            lt: None,
            lte: None,
            min_length: None,
            max_length: None,
            pattern: None,
            one_of: Vec::new(),
            min_items: None,
            max_items: None,
            items: None,
            schema: None,
            error: None,
        }
    }

    pub fn string() -> Self {
        FieldRule::new(FieldType::String)
    }

    pub fn integer() -> Self {
        FieldRule::new(FieldType::Integer)
    }

    pub fn float() -> Self {
        FieldRule::new(FieldType::Float)
    }

    pub fn number() -> Self {
        FieldRule::new(FieldType::Number)
    }

    pub fn bool() -> Self {
        FieldRule::new(FieldType::Bool)
    }

    pub fn timestamp() -> Self {
        FieldRule::new(FieldType::Timestamp)
    }

    /// An embedded document validated against `schema`.
    pub fn document(schema: Schema) -> Self {
        FieldRule::new(FieldType::Document).schema(schema)
    }

    pub fn array() -> Self {
        FieldRule::new(FieldType::Array)
    }

    pub fn any() -> Self {
        FieldRule::new(FieldType::Any)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn gt<T: Into<Value>>(mut self, bound: T) -> Self {
        self.gt = Some(bound.into());
        self
    }

    pub fn gte<T: Into<Value>>(mut self, bound: T) -> Self {
        self.gte = Some(bound.into());
        self
    }

    pub fn lt<T: Into<Value>>(mut self, bound: T) -> Self {
        self.lt = Some(bound.into());
        self
    }

    pub fn lte<T: Into<Value>>(mut self, bound: T) -> Self {
        self.lte = Some(bound.into());
        self
    }

    /// Minimum string length in characters.
    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    /// Maximum string length in characters.
    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => self.pattern = Some(regex),
            Err(e) => {
                log::error!("Invalid validation pattern '{}': {}", pattern, e);
                if self.error.is_none() {
                    self.error = Some(DocketError::new(
                        &format!("Invalid validation pattern '{}': {}", pattern, e),
                        ErrorKind::ConfigError,
                    ));
                }
            }
        }
        self
    }

    /// Restricts the value to one of the given values.
    pub fn one_of<T: Into<Value>>(mut self, values: Vec<T>) -> Self {
        self.one_of = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_items(mut self, count: usize) -> Self {
        self.min_items = Some(count);
        self
    }

    pub fn max_items(mut self, count: usize) -> Self {
        self.max_items = Some(count);
        self
    }

    /// A rule every element of an array field must satisfy.
    pub fn items(mut self, rule: FieldRule) -> Self {
        self.items = Some(Arc::new(rule));
        self
    }

    /// A nested schema for an embedded document, or for each element of an
    /// array of documents.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub(crate) fn error(&self) -> Option<&DocketError> {
        self.error.as_ref().or_else(|| self.items.as_ref().and_then(|it| it.error()))
    }

    pub(crate) fn nested_schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    /// Checks one value, pushing violations, and returns the value to store.
    ///
    /// Only RFC 3339 strings in timestamp fields differ from their input.
    pub(crate) fn check(&self, path: &str, value: &Value, violations: &mut Vec<Violation>) -> Value {
        self.check_value(path, value, false, violations)
    }

    /// Like [check](FieldRule::check), but an embedded document is checked in
    /// partial mode: its absent fields are skipped. Array elements are always
    /// checked in full.
    pub(crate) fn check_value(
        &self,
        path: &str,
        value: &Value,
        partial: bool,
        violations: &mut Vec<Violation>,
    ) -> Value {
        if value.is_null() {
            if self.required {
                violations.push(Violation::new(path, "is required"));
            }
            return Value::Null;
        }

        if !self.field_type.matches(value) {
            violations.push(Violation::new(
                path,
                format!("must be of type {} but was {}", self.field_type, value.type_name()),
            ));
            return value.clone();
        }

        let value = match (self.field_type, value) {
            (FieldType::Timestamp, Value::String(_)) => {
                parse_timestamp(value).map(Value::Timestamp).unwrap_or_else(|| value.clone())
            }
            _ => value.clone(),
        };

        self.check_bounds(path, &value, violations);
        self.check_string(path, &value, violations);

        if !self.one_of.is_empty() && !self.one_of.contains(&value) {
            let allowed = self.one_of.iter().map(|v| v.to_string()).join(", ");
            violations.push(Violation::new(path, format!("must be one of [{}]", allowed)));
        }

        match value {
            Value::Array(items) => Value::Array(self.check_array(path, items, violations)),
            Value::Document(doc) => match &self.schema {
                Some(schema) => Value::Document(schema.check_document(&doc, path, partial, violations)),
                None => Value::Document(doc),
            },
            other => other,
        }
    }

    fn check_bounds(&self, path: &str, value: &Value, violations: &mut Vec<Violation>) {
        let comparable = |bound: &Value| value.is_comparable_with(bound);
        if let Some(bound) = &self.gt {
            if !comparable(bound) || value <= bound {
                violations.push(Violation::new(path, format!("must be greater than {}", bound)));
            }
        }
        if let Some(bound) = &self.gte {
            if !comparable(bound) || value < bound {
                violations.push(Violation::new(
                    path,
                    format!("must be greater than or equal to {}", bound),
                ));
            }
        }
        if let Some(bound) = &self.lt {
            if !comparable(bound) || value >= bound {
                violations.push(Violation::new(path, format!("must be less than {}", bound)));
            }
        }
        if let Some(bound) = &self.lte {
            if !comparable(bound) || value > bound {
                violations.push(Violation::new(
                    path,
                    format!("must be less than or equal to {}", bound),
                ));
            }
        }
    }

    fn check_string(&self, path: &str, value: &Value, violations: &mut Vec<Violation>) {
        let text = match value.as_str() {
            Some(text) => text,
            None => return,
        };
        let length = text.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                violations.push(Violation::new(path, format!("must be at least {} characters", min)));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                violations.push(Violation::new(path, format!("must be at most {} characters", max)));
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(text) {
                violations.push(Violation::new(
                    path,
                    format!("must match pattern {}", pattern.as_str()),
                ));
            }
        }
    }

    fn check_array(&self, path: &str, items: Vec<Value>, violations: &mut Vec<Violation>) -> Vec<Value> {
        if let Some(min) = self.min_items {
            if items.len() < min {
                violations.push(Violation::new(path, format!("must contain at least {} items", min)));
            }
        }
        if let Some(max) = self.max_items {
            if items.len() > max {
                violations.push(Violation::new(path, format!("must contain at most {} items", max)));
            }
        }

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let item_path = format!("{}{}{}", path, FIELD_SEPARATOR, index);
                let item = match &self.items {
                    Some(rule) => rule.check(&item_path, &item, violations),
                    None => item,
                };
                match (item, &self.schema) {
                    (Value::Document(doc), Some(schema)) => {
                        Value::Document(schema.check_document(&doc, &item_path, false, violations))
                    }
                    (item, _) => item,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use chrono::TimeZone;

    fn check(rule: &FieldRule, value: Value) -> (Value, Vec<Violation>) {
        let mut violations = Vec::new();
        let out = rule.check("f", &value, &mut violations);
        (out, violations)
    }

    #[test]
    fn field_type_matching() {
        assert!(FieldType::Integer.matches(&Value::I64(1)));
        assert!(!FieldType::Integer.matches(&Value::F64(1.5)));
        assert!(FieldType::Float.matches(&Value::I64(1)));
        assert!(FieldType::Number.matches(&Value::F64(1.5)));
        assert!(FieldType::Timestamp.matches(&Value::from("2024-01-01T00:00:00Z")));
        assert!(!FieldType::Timestamp.matches(&Value::from("yesterday")));
        assert!(FieldType::Any.matches(&Value::Bool(true)));
    }

    #[test]
    fn required_and_optional() {
        let (_, violations) = check(&FieldRule::string().required(), Value::Null);
        assert_eq!(violations, vec![Violation::new("f", "is required")]);
        let (_, violations) = check(&FieldRule::string(), Value::Null);
        assert!(violations.is_empty());
    }

    #[test]
    fn wrong_type_reports_once() {
        let (_, violations) = check(&FieldRule::number().gt(0).required(), Value::from("ten"));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].constraint().starts_with("must be of type number"));
    }

    #[test]
    fn numeric_bounds_aggregate() {
        let rule = FieldRule::number().gt(0).lte(100);
        assert!(check(&rule, Value::I64(50)).1.is_empty());
        assert_eq!(check(&rule, Value::I64(0)).1.len(), 1);
        assert_eq!(check(&rule, Value::F64(100.5)).1.len(), 1);

        let both = FieldRule::number().gte(10).lt(5);
        assert_eq!(check(&both, Value::I64(7)).1.len(), 2);
    }

    #[test]
    fn string_rules() {
        let rule = FieldRule::string().min_length(2).max_length(4).pattern("^[a-z]+$");
        assert!(check(&rule, Value::from("abc")).1.is_empty());
        assert_eq!(check(&rule, Value::from("a")).1.len(), 1);
        assert_eq!(check(&rule, Value::from("ABCDE")).1.len(), 2);
        assert!(check(&rule, Value::from("été")).1.len() == 1);
    }

    #[test]
    fn invalid_pattern_is_captured() {
        let rule = FieldRule::string().pattern("(");
        assert_eq!(rule.error().unwrap().kind(), &ErrorKind::ConfigError);
    }

    #[test]
    fn one_of_membership() {
        let rule = FieldRule::string().one_of(vec!["open", "closed"]);
        assert!(check(&rule, Value::from("open")).1.is_empty());
        let (_, violations) = check(&rule, Value::from("lost"));
        assert_eq!(violations[0].constraint(), "must be one of [\"open\", \"closed\"]");
    }

    #[test]
    fn array_bounds_and_items() {
        let rule = FieldRule::array()
            .min_items(1)
            .max_items(3)
            .items(FieldRule::string().min_length(1));
        assert!(check(&rule, Value::from(vec!["a", "b"])).1.is_empty());
        assert_eq!(check(&rule, Value::Array(vec![])).1.len(), 1);

        let (_, violations) = check(&rule, Value::from(vec!["a", ""]));
        assert_eq!(violations, vec![Violation::new("f.1", "must be at least 1 characters")]);
    }

    #[test]
    fn nested_schema_for_documents_and_arrays() {
        let variant = Schema::new().field("sku", FieldRule::string().required());
        let rule = FieldRule::array().schema(variant.clone());
        let value = Value::from(vec![doc! { sku: "A" }, doc! { color: "red" }]);
        let (_, violations) = check(&rule, value);
        assert_eq!(violations, vec![Violation::new("f.1.sku", "is required")]);

        let rule = FieldRule::document(variant);
        let (_, violations) = check(&rule, Value::from(doc! { sku: 5 }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field(), "f.sku");
    }

    #[test]
    fn timestamp_strings_are_converted() {
        let (out, violations) = check(&FieldRule::timestamp(), Value::from("2024-01-02T03:04:05Z"));
        assert!(violations.is_empty());
        assert_eq!(out, Value::Timestamp(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()));
    }
}
