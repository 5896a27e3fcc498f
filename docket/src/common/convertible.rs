use crate::collection::{Document, DocumentId};
use crate::common::Value;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use chrono::{DateTime, Utc};

/// Conversion between Rust values and document [Value]s.
///
/// Entities use it to map their fields in
/// [`crate::repository::Entity::to_document`] and `from_document`.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> DocketResult<Value>;
    fn from_value(value: &Value) -> DocketResult<Self::Output>;
}

fn mapping_error(value: &Value, expected: &str) -> DocketError {
    log::error!("Value {} is not a {}", value, expected);
    DocketError::new(
        &format!("Expected {} but found {}", expected, value.type_name()),
        ErrorKind::ObjectMappingError,
    )
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> DocketResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> DocketResult<bool> {
        value.as_bool().ok_or_else(|| mapping_error(value, "bool"))
    }
}

impl Convertible for i64 {
    type Output = i64;

    fn to_value(&self) -> DocketResult<Value> {
        Ok(Value::I64(*self))
    }

    fn from_value(value: &Value) -> DocketResult<i64> {
        value.as_i64().ok_or_else(|| mapping_error(value, "integer"))
    }
}

impl Convertible for u32 {
    type Output = u32;

    fn to_value(&self) -> DocketResult<Value> {
        Ok(Value::I64(*self as i64))
    }

    fn from_value(value: &Value) -> DocketResult<u32> {
        let i = value.as_i64().ok_or_else(|| mapping_error(value, "integer"))?;
        u32::try_from(i).map_err(|_| mapping_error(value, "u32"))
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> DocketResult<Value> {
        Ok(Value::F64(*self))
    }

    // integers are accepted, a stored price of 10 reads back as 10.0
    fn from_value(value: &Value) -> DocketResult<f64> {
        value.as_f64().ok_or_else(|| mapping_error(value, "number"))
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> DocketResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> DocketResult<String> {
        value.as_string().cloned().ok_or_else(|| mapping_error(value, "string"))
    }
}

impl Convertible for DateTime<Utc> {
    type Output = DateTime<Utc>;

    fn to_value(&self) -> DocketResult<Value> {
        Ok(Value::Timestamp(*self))
    }

    fn from_value(value: &Value) -> DocketResult<DateTime<Utc>> {
        value.as_timestamp().copied().ok_or_else(|| mapping_error(value, "timestamp"))
    }
}

impl Convertible for DocumentId {
    type Output = DocumentId;

    fn to_value(&self) -> DocketResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn from_value(value: &Value) -> DocketResult<DocumentId> {
        let s = value.as_str().ok_or_else(|| mapping_error(value, "id string"))?;
        DocumentId::parse(s)
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> DocketResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> DocketResult<Document> {
        value.as_document().cloned().ok_or_else(|| mapping_error(value, "document"))
    }
}

impl<T: Convertible<Output = T>> Convertible for Option<T> {
    type Output = Option<T>;

    fn to_value(&self) -> DocketResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> DocketResult<Option<T>> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl<T: Convertible<Output = T>> Convertible for Vec<T> {
    type Output = Vec<T>;

    fn to_value(&self) -> DocketResult<Value> {
        let mut values = Vec::with_capacity(self.len());
        for item in self {
            values.push(item.to_value()?);
        }
        Ok(Value::Array(values))
    }

    fn from_value(value: &Value) -> DocketResult<Vec<T>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            v => Err(mapping_error(v, "array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_convert_both_ways() {
        assert_eq!(true.to_value().unwrap(), Value::Bool(true));
        assert_eq!(i64::from_value(&Value::I64(7)).unwrap(), 7);
        assert_eq!(String::from_value(&Value::from("x")).unwrap(), "x");
        assert_eq!(u32::from_value(&Value::I64(3)).unwrap(), 3);
    }

    #[test]
    fn f64_accepts_integers() {
        assert_eq!(f64::from_value(&Value::I64(10)).unwrap(), 10.0);
    }

    #[test]
    fn negative_u32_is_mapping_error() {
        let err = u32::from_value(&Value::I64(-1)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }

    #[test]
    fn option_maps_null_to_none() {
        assert_eq!(Option::<String>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Some(5i64).to_value().unwrap(), Value::I64(5));
    }

    #[test]
    fn vec_maps_arrays() {
        let value = vec!["a".to_string(), "b".to_string()].to_value().unwrap();
        assert_eq!(Vec::<String>::from_value(&value).unwrap(), vec!["a", "b"]);
        assert!(Vec::<String>::from_value(&Value::I64(1)).is_err());
    }

    #[test]
    fn type_mismatch_is_mapping_error() {
        let err = bool::from_value(&Value::from("yes")).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }
}
