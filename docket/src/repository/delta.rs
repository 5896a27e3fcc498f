use std::fmt::Display;

use crate::collection::Document;
use crate::filter::Filter;
use crate::store::{PullCondition, UpdateOperator, UpdateSpec};
use crate::{Value, FIELD_SEPARATOR};

/// An atomic in-place change applied by [`crate::repository::Repository::apply_delta`].
///
/// All deltas of one call are applied to the stored document in a single
/// store update.
#[derive(Clone)]
pub enum DeltaOp {
    /// Adds `by` to a numeric field. A missing field starts from zero.
    Increment { field: String, by: Value },
    /// Stores `value` when it is lower than the current one.
    SetIfMin { field: String, value: Value },
    /// Stores `value` when it is higher than the current one.
    SetIfMax { field: String, value: Value },
    /// Appends `value` to an array unless an equal element is present.
    AddUnique { field: String, value: Value },
    /// Removes array elements equal to a value or matching a filter.
    RemoveMatching { field: String, condition: PullCondition },
    /// Merges `fields` into the first sub-document of `array` whose
    /// `match_key` equals `match_value`. The target document must hold such
    /// an element.
    ReplaceElement {
        array: String,
        match_key: String,
        match_value: Value,
        fields: Document,
    },
}

impl DeltaOp {
    pub fn increment<T: Into<Value>>(field: &str, by: T) -> Self {
        DeltaOp::Increment {
            field: field.to_string(),
            by: by.into(),
        }
    }

    pub fn set_if_min<T: Into<Value>>(field: &str, value: T) -> Self {
        DeltaOp::SetIfMin {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn set_if_max<T: Into<Value>>(field: &str, value: T) -> Self {
        DeltaOp::SetIfMax {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn add_unique<T: Into<Value>>(field: &str, value: T) -> Self {
        DeltaOp::AddUnique {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn remove_value<T: Into<Value>>(field: &str, value: T) -> Self {
        DeltaOp::RemoveMatching {
            field: field.to_string(),
            condition: PullCondition::Value(value.into()),
        }
    }

    pub fn remove_matching(field: &str, filter: Filter) -> Self {
        DeltaOp::RemoveMatching {
            field: field.to_string(),
            condition: PullCondition::Matching(filter),
        }
    }

    pub fn replace_element<T: Into<Value>>(array: &str, match_key: &str, match_value: T, fields: Document) -> Self {
        DeltaOp::ReplaceElement {
            array: array.to_string(),
            match_key: match_key.to_string(),
            match_value: match_value.into(),
            fields,
        }
    }

    /// The field the delta writes.
    pub fn field(&self) -> &str {
        match self {
            DeltaOp::Increment { field, .. }
            | DeltaOp::SetIfMin { field, .. }
            | DeltaOp::SetIfMax { field, .. }
            | DeltaOp::AddUnique { field, .. }
            | DeltaOp::RemoveMatching { field, .. } => field,
            DeltaOp::ReplaceElement { array, .. } => array,
        }
    }

    /// The element a [DeltaOp::ReplaceElement] requires, as a dot path and value.
    pub(crate) fn required_element(&self) -> Option<(String, &Value)> {
        match self {
            DeltaOp::ReplaceElement {
                array,
                match_key,
                match_value,
                ..
            } => Some((format!("{}{}{}", array, FIELD_SEPARATOR, match_key), match_value)),
            _ => None,
        }
    }

    fn to_operator(&self) -> UpdateOperator {
        match self.clone() {
            DeltaOp::Increment { field, by } => UpdateOperator::Inc(field, by),
            DeltaOp::SetIfMin { field, value } => UpdateOperator::Min(field, value),
            DeltaOp::SetIfMax { field, value } => UpdateOperator::Max(field, value),
            DeltaOp::AddUnique { field, value } => UpdateOperator::AddToSet(field, value),
            DeltaOp::RemoveMatching { field, condition } => UpdateOperator::Pull(field, condition),
            DeltaOp::ReplaceElement {
                array,
                match_key,
                match_value,
                fields,
            } => UpdateOperator::SetElement {
                array,
                match_key,
                match_value,
                fields,
            },
        }
    }
}

impl Display for DeltaOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_operator())
    }
}

/// Translates deltas into one store update.
pub(crate) fn to_update_spec(ops: &[DeltaOp]) -> UpdateSpec {
    ops.iter()
        .fold(UpdateSpec::new(), |spec, op| spec.operator(op.to_operator()))
}
