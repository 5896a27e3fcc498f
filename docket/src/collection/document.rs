use im::OrdMap;
use smallvec::SmallVec;

use crate::collection::DocumentId;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR, RESERVED_FIELDS};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use itertools::Itertools;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

type FieldVec = SmallVec<[String; 8]>;

/// A semi-structured record stored in a collection.
///
/// A document maps [String] keys to [Value]s. Embedded fields are addressed
/// with dot paths: `doc.get("address.city")` reads `city` inside the nested
/// `address` document, `doc.get("variants.0.sku")` reads the first element of
/// an array, and `doc.get("variants.sku")` collects `sku` from every element.
///
/// The `id` field holds the document's identifier as an opaque string. Once a
/// document is persisted its `id` never changes.
///
/// Documents are backed by `im::OrdMap`, so clones are O(1) and mutation uses
/// structural sharing.
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates the specified [Value] with the specified key.
    ///
    /// Embedded keys (`"address.city"`) create intermediate documents as
    /// needed.
    ///
    /// # Errors
    ///
    /// * the key, or a segment of an embedded key, is empty
    /// * the key is `id` and the value is not a non-empty string
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Widget")?;
    /// doc.put("dimensions.width", 12)?;
    /// assert_eq!(doc.get("dimensions.width"), Value::I64(12));
    /// ```
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> DocketResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocketError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();
        if key == DOC_ID {
            let valid = value.as_str().map(|s| !s.trim().is_empty()).unwrap_or(false);
            if !valid {
                log::error!("Document id must be a non-empty string, found {}", value);
                return Err(DocketError::new(
                    "Document id must be a non-empty string",
                    ErrorKind::InvalidId,
                ));
            }
        }

        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data = self.data.update(key.to_string(), value);
            Ok(())
        }
    }

    /// Puts a top-level entry without interpreting separators in the key.
    pub(crate) fn put_raw(&mut self, key: &str, value: Value) {
        self.data = self.data.update(key.to_string(), value);
    }

    /// Returns the value for the key, or [Value::Null] when absent.
    ///
    /// Out-of-bound array indices also read as [Value::Null].
    pub fn get(&self, key: &str) -> Value {
        match self.data.get(key) {
            Some(value) => value.clone(),
            None if key.contains(FIELD_SEPARATOR) => self.get_by_embedded_key(key),
            None => Value::Null,
        }
    }

    /// Returns the document id if one has been assigned.
    pub fn id(&self) -> Option<DocumentId> {
        self.data
            .get(DOC_ID)
            .and_then(|v| v.as_str())
            .and_then(|s| DocumentId::parse(s).ok())
    }

    /// Returns the document id, generating and storing one when missing.
    pub fn ensure_id(&mut self) -> DocumentId {
        match self.id() {
            Some(id) => id,
            None => {
                let id = DocumentId::new();
                self.data = self.data.update(DOC_ID.to_string(), Value::from(&id));
                id
            }
        }
    }

    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// All user field paths, top level and embedded, excluding reserved fields.
    pub fn fields(&self) -> FieldVec {
        self.get_fields_internal("")
    }

    /// Top-level keys including reserved fields.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Removes the key and its value. Removing a missing key is not an error.
    pub fn remove(&mut self, key: &str) -> DocketResult<()> {
        if self.data.contains_key(key) || !key.contains(FIELD_SEPARATOR) {
            self.data = self.data.without(key);
            Ok(())
        } else {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_remove(&splits)
        }
    }

    /// Number of top-level entries.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Merges `other` into this document. Nested documents merge recursively;
    /// any other value from `other` overwrites.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            match (value, self.data.get(key)) {
                (Value::Document(incoming), Some(Value::Document(existing))) => {
                    let mut nested = existing.clone();
                    nested.merge(incoming);
                    self.data = self.data.update(key.clone(), Value::Document(nested));
                }
                _ => {
                    self.data = self.data.update(key.clone(), value.clone());
                }
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Whether the field path resolves to a stored entry (which may hold null).
    pub fn contains_field(&self, field: &str) -> bool {
        if self.contains_key(field) {
            return true;
        }
        if !field.contains(FIELD_SEPARATOR) {
            return false;
        }
        let (parent, leaf) = match field.rsplit_once(FIELD_SEPARATOR) {
            Some(split) => split,
            None => return false,
        };
        match self.get(parent) {
            Value::Document(doc) => doc.contains_key(leaf),
            Value::Array(items) => match leaf.parse::<usize>() {
                Ok(index) => index < items.len(),
                Err(_) => items
                    .iter()
                    .any(|it| it.as_document().map(|d| d.contains_key(leaf)).unwrap_or(false)),
            },
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Returns a copy holding only the given top-level fields plus `id`.
    pub fn project(&self, fields: &[String]) -> Document {
        let mut projected = Document::new();
        for (key, value) in self.data.iter() {
            if key == DOC_ID || fields.iter().any(|f| f == key) {
                projected.put_raw(key, value.clone());
            }
        }
        projected
    }

    /// Converts to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.data.len());
        for (key, value) in self.data.iter() {
            map.insert(key.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }

    /// Builds a document from a JSON object.
    pub fn from_json(json: &serde_json::Value) -> DocketResult<Document> {
        match Value::from_json(json) {
            Value::Document(doc) => Ok(doc),
            other => {
                log::error!("Expected a JSON object but found {}", other.type_name());
                Err(DocketError::new(
                    &format!("Expected a JSON object but found {}", other.type_name()),
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut json_string = String::with_capacity(self.data.len() * 30 + indent * 2);
        json_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            json_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_pretty_json(indent + 2)
            ));
        }

        json_string.pop();
        json_string.pop();
        json_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        json_string
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        let entries = self
            .data
            .iter()
            .map(|(key, value)| format!("\"{}\": {}", key, value.to_debug_string(indent + 2)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", entries)
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();

        for (key, value) in self.data.iter() {
            if prefix.is_empty() && RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }

            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
            };

            if let Value::Document(doc) = value {
                fields.append(&mut doc.get_fields_internal(&field));
            } else {
                fields.push(field);
            }
        }
        fields
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> DocketResult<()> {
        let key = splits.first().copied().unwrap_or_default();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocketError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if splits.len() == 1 {
            self.data = self.data.update(key.to_string(), value);
            return Ok(());
        }

        // a non-document value on the path is replaced by a new document
        let mut nested = match self.data.get(key) {
            Some(Value::Document(obj)) => obj.clone(),
            _ => Document::new(),
        };
        nested.deep_put(&splits[1..], value)?;
        self.data = self.data.update(key.to_string(), Value::Document(nested));
        Ok(())
    }

    fn deep_remove(&mut self, splits: &[&str]) -> DocketResult<()> {
        let key = splits.first().copied().unwrap_or_default();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocketError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if splits.len() == 1 {
            self.data = self.data.without(key);
            return Ok(());
        }

        match self.data.get(key) {
            Some(Value::Document(obj)) => {
                let mut nested = obj.clone();
                nested.deep_remove(&splits[1..])?;
                self.data = self.data.update(key.to_string(), Value::Document(nested));
                Ok(())
            }
            Some(Value::Array(arr)) => {
                let index = splits[1].parse::<usize>().map_err(|_| {
                    log::error!("Invalid array index {} to access array inside a document", splits[1]);
                    DocketError::new(
                        &format!("Invalid array index {} to access array inside a document", splits[1]),
                        ErrorKind::InvalidOperation,
                    )
                })?;
                if index >= arr.len() {
                    return Ok(());
                }

                let mut new_arr = arr.clone();
                match (&new_arr[index], splits.len() > 2) {
                    (Value::Document(obj), true) => {
                        let mut nested = obj.clone();
                        nested.deep_remove(&splits[2..])?;
                        new_arr[index] = Value::Document(nested);
                    }
                    _ => {
                        new_arr.remove(index);
                    }
                }
                self.data = self.data.update(key.to_string(), Value::Array(new_arr));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn get_by_embedded_key(&self, key: &str) -> Value {
        let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        match splits.first() {
            Some(first) if !first.is_empty() => recursive_get(self.data.get(*first), &splits[1..]),
            _ => Value::Null,
        }
    }
}

fn recursive_get(value: Option<&Value>, splits: &[&str]) -> Value {
    let value = match value {
        None => return Value::Null,
        Some(v) => v,
    };

    let key = match splits.first() {
        None => return value.clone(),
        Some(key) if key.is_empty() => return Value::Null,
        Some(key) => *key,
    };

    match value {
        Value::Document(obj) => recursive_get(obj.data.get(key), &splits[1..]),
        Value::Array(arr) => match key.parse::<usize>() {
            Ok(index) => recursive_get(arr.get(index), &splits[1..]),
            // a non-numeric key collects the path from every element
            Err(_) => decompose(arr, splits),
        },
        _ => Value::Null,
    }
}

fn decompose(arr: &[Value], splits: &[&str]) -> Value {
    let mut items: Vec<Value> = Vec::with_capacity(arr.len());
    for item in arr {
        match recursive_get(Some(item), splits) {
            Value::Null => {}
            Value::Array(values) => items.extend(values),
            value => items.push(value),
        }
    }
    Value::Array(items.into_iter().unique().collect())
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// Negative numbers and other multi-token expressions go in parentheses.
///
/// ```rust
/// use docket::doc;
///
/// let empty = doc!{};
///
/// let product = doc!{
///     name: "Widget",
///     price: 10,
///     discount: (-2),
///     dimensions: { width: 12, height: 4 },
///     tags: ["tools", "metal"]
/// };
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
