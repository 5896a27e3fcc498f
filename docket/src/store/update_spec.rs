use crate::collection::Document;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::Filter;
use crate::{Value, DOC_ID, FIELD_SEPARATOR};
use chrono::Utc;
use std::fmt::{Debug, Display};
use std::sync::Arc;

/// A check run on the updated document before it is committed.
pub type UpdateGuard = Arc<dyn Fn(&Document) -> DocketResult<()> + Send + Sync>;

/// How [UpdateOperator::Pull] selects the elements to remove.
#[derive(Clone)]
pub enum PullCondition {
    /// Elements equal to the value.
    Value(Value),
    /// Sub-document elements matching the filter.
    Matching(Filter),
}

/// A single field operator.
#[derive(Clone)]
pub enum UpdateOperator {
    Set(String, Value),
    Unset(String),
    /// Adds a number; a missing field starts from zero.
    Inc(String, Value),
    /// Replaces the field when the value is lower, or when the field is missing.
    Min(String, Value),
    /// Replaces the field when the value is higher, or when the field is missing.
    Max(String, Value),
    /// Appends the value to an array unless an equal element is present.
    AddToSet(String, Value),
    Pull(String, PullCondition),
    /// Merges `fields` into the first sub-document of `array` whose
    /// `match_key` equals `match_value`.
    SetElement {
        array: String,
        match_key: String,
        match_value: Value,
        fields: Document,
    },
}

impl UpdateOperator {
    /// The field path the operator writes.
    pub fn path(&self) -> &str {
        match self {
            UpdateOperator::Set(path, _)
            | UpdateOperator::Unset(path)
            | UpdateOperator::Inc(path, _)
            | UpdateOperator::Min(path, _)
            | UpdateOperator::Max(path, _)
            | UpdateOperator::AddToSet(path, _)
            | UpdateOperator::Pull(path, _) => path,
            UpdateOperator::SetElement { array, .. } => array,
        }
    }
}

impl Display for UpdateOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateOperator::Set(path, value) => write!(f, "set({}, {})", path, value),
            UpdateOperator::Unset(path) => write!(f, "unset({})", path),
            UpdateOperator::Inc(path, value) => write!(f, "inc({}, {})", path, value),
            UpdateOperator::Min(path, value) => write!(f, "min({}, {})", path, value),
            UpdateOperator::Max(path, value) => write!(f, "max({}, {})", path, value),
            UpdateOperator::AddToSet(path, value) => write!(f, "add_to_set({}, {})", path, value),
            UpdateOperator::Pull(path, PullCondition::Value(value)) => {
                write!(f, "pull({}, {})", path, value)
            }
            UpdateOperator::Pull(path, PullCondition::Matching(filter)) => {
                write!(f, "pull({}, {})", path, filter)
            }
            UpdateOperator::SetElement {
                array,
                match_key,
                match_value,
                ..
            } => write!(f, "set_element({}[{} == {}])", array, match_key, match_value),
        }
    }
}

/// An atomic update of one document.
///
/// The store applies every operator to a copy of the document under the
/// collection's write lock. The copy replaces the stored document only when
/// all operators succeed and the guard, if any, accepts the result.
///
/// ```rust,ignore
/// let spec = UpdateSpec::new()
///     .inc("stock", -1)
///     .add_to_set("tags", "sale")
///     .stamp_on_change("updated_at");
/// store.update_one("products", &by_id(&id), &spec)?;
/// ```
#[derive(Clone, Default)]
pub struct UpdateSpec {
    operators: Vec<UpdateOperator>,
    guard: Option<UpdateGuard>,
    stamp_field: Option<String>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        UpdateSpec::default()
    }

    /// A `set` operator for each leaf path of `fields`.
    ///
    /// Embedded documents are descended into, so `{dimensions: {width: 5}}`
    /// sets `dimensions.width` and leaves the other embedded fields alone.
    /// Arrays and empty documents are set as whole values.
    pub fn from_document(fields: &Document) -> Self {
        let mut operators = Vec::with_capacity(fields.size());
        collect_leaf_sets(fields, "", &mut operators);
        UpdateSpec {
            operators,
            ..Default::default()
        }
    }

    pub fn operator(mut self, operator: UpdateOperator) -> Self {
        self.operators.push(operator);
        self
    }

    pub fn set<T: Into<Value>>(self, path: &str, value: T) -> Self {
        self.operator(UpdateOperator::Set(path.to_string(), value.into()))
    }

    pub fn unset(self, path: &str) -> Self {
        self.operator(UpdateOperator::Unset(path.to_string()))
    }

    pub fn inc<T: Into<Value>>(self, path: &str, delta: T) -> Self {
        self.operator(UpdateOperator::Inc(path.to_string(), delta.into()))
    }

    pub fn min<T: Into<Value>>(self, path: &str, value: T) -> Self {
        self.operator(UpdateOperator::Min(path.to_string(), value.into()))
    }

    pub fn max<T: Into<Value>>(self, path: &str, value: T) -> Self {
        self.operator(UpdateOperator::Max(path.to_string(), value.into()))
    }

    pub fn add_to_set<T: Into<Value>>(self, path: &str, value: T) -> Self {
        self.operator(UpdateOperator::AddToSet(path.to_string(), value.into()))
    }

    pub fn pull<T: Into<Value>>(self, path: &str, value: T) -> Self {
        self.operator(UpdateOperator::Pull(path.to_string(), PullCondition::Value(value.into())))
    }

    pub fn pull_matching(self, path: &str, filter: Filter) -> Self {
        self.operator(UpdateOperator::Pull(path.to_string(), PullCondition::Matching(filter)))
    }

    pub fn set_element<T: Into<Value>>(self, array: &str, match_key: &str, match_value: T, fields: Document) -> Self {
        self.operator(UpdateOperator::SetElement {
            array: array.to_string(),
            match_key: match_key.to_string(),
            match_value: match_value.into(),
            fields,
        })
    }

    /// Sets `field` to the current time when the update changes the document.
    pub fn stamp_on_change(mut self, field: &str) -> Self {
        self.stamp_field = Some(field.to_string());
        self
    }

    /// Installs a check that must accept the updated document.
    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&Document) -> DocketResult<()> + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    pub fn operators(&self) -> &[UpdateOperator] {
        &self.operators
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Distinct paths written by the operators, in order.
    pub fn touched_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::with_capacity(self.operators.len());
        for op in &self.operators {
            if !fields.iter().any(|f| f == op.path()) {
                fields.push(op.path().to_string());
            }
        }
        fields
    }

    /// Applies every operator to `doc` and reports whether it changed.
    ///
    /// On error `doc` may be partially updated; the store discards it.
    pub fn apply(&self, doc: &mut Document) -> DocketResult<bool> {
        let before = doc.clone();
        for operator in &self.operators {
            apply_operator(doc, operator)?;
        }

        let changed = *doc != before;
        if changed {
            if let Some(guard) = &self.guard {
                guard(doc)?;
            }
            if let Some(field) = &self.stamp_field {
                doc.put(field.as_str(), Utc::now())?;
            }
        }
        Ok(changed)
    }
}

impl Debug for UpdateSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operators = self
            .operators
            .iter()
            .map(|op| op.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "UpdateSpec[{}]", operators)
    }
}

fn collect_leaf_sets(fields: &Document, prefix: &str, operators: &mut Vec<UpdateOperator>) {
    for (key, value) in fields.iter() {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
        };
        match value {
            Value::Document(nested) if !nested.is_empty() => collect_leaf_sets(nested, &path, operators),
            _ => operators.push(UpdateOperator::Set(path, value.clone())),
        }
    }
}

fn apply_operator(doc: &mut Document, operator: &UpdateOperator) -> DocketResult<()> {
    let path = operator.path();
    if path == DOC_ID {
        log::error!("Update operator {} targets the immutable id field", operator);
        return Err(DocketError::new(
            "Document id is immutable",
            ErrorKind::InvalidOperation,
        ));
    }

    match operator {
        UpdateOperator::Set(path, value) => doc.put(path.as_str(), value.clone()),
        UpdateOperator::Unset(path) => doc.remove(path),
        UpdateOperator::Inc(path, delta) => {
            if !delta.is_number() {
                return Err(operator_error(operator, "increment must be a number"));
            }
            let current = doc.get(path);
            let updated = match current {
                Value::Null => delta.clone(),
                ref number if number.is_number() => number.checked_add(delta)?,
                _ => return Err(operator_error(operator, "field is not a number")),
            };
            doc.put(path.as_str(), updated)
        }
        UpdateOperator::Min(path, value) | UpdateOperator::Max(path, value) => {
            let current = doc.get(path);
            let replace = if current.is_null() {
                true
            } else if !current.is_comparable_with(value) {
                return Err(operator_error(operator, "values are not comparable"));
            } else if matches!(operator, UpdateOperator::Min(..)) {
                value < &current
            } else {
                value > &current
            };
            if replace {
                doc.put(path.as_str(), value.clone())?;
            }
            Ok(())
        }
        UpdateOperator::AddToSet(path, value) => match doc.get(path) {
            Value::Null => doc.put(path.as_str(), Value::Array(vec![value.clone()])),
            Value::Array(mut items) => {
                if !items.contains(value) {
                    items.push(value.clone());
                    doc.put(path.as_str(), Value::Array(items))?;
                }
                Ok(())
            }
            _ => Err(operator_error(operator, "field is not an array")),
        },
        UpdateOperator::Pull(path, condition) => match doc.get(path) {
            Value::Null => Ok(()),
            Value::Array(items) => {
                let mut kept = Vec::with_capacity(items.len());
                for item in items {
                    let remove = match (condition, &item) {
                        (PullCondition::Value(value), _) => &item == value,
                        (PullCondition::Matching(filter), Value::Document(element)) => filter.apply(element)?,
                        (PullCondition::Matching(_), _) => false,
                    };
                    if !remove {
                        kept.push(item);
                    }
                }
                doc.put(path.as_str(), Value::Array(kept))
            }
            _ => Err(operator_error(operator, "field is not an array")),
        },
        UpdateOperator::SetElement {
            array,
            match_key,
            match_value,
            fields,
        } => match doc.get(array) {
            Value::Null => Ok(()),
            Value::Array(mut items) => {
                let position = items.iter().position(|item| {
                    item.as_document()
                        .map(|element| &element.get(match_key) == match_value)
                        .unwrap_or(false)
                });
                if let Some(index) = position {
                    if let Some(element) = items[index].as_document_mut() {
                        for (key, value) in fields.iter() {
                            element.put(key.as_str(), value.clone())?;
                        }
                    }
                    doc.put(array.as_str(), Value::Array(items))?;
                }
                Ok(())
            }
            _ => Err(operator_error(operator, "field is not an array")),
        },
    }
}

fn operator_error(operator: &UpdateOperator, reason: &str) -> DocketError {
    log::error!("Cannot apply {}: {}", operator, reason);
    DocketError::new(
        &format!("Cannot apply {}: {}", operator, reason),
        ErrorKind::InvalidOperation,
    )
}
