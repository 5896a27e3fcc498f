use std::{any::Any, fmt::Display};

use crate::{collection::Document, errors::DocketResult, Value};

use super::{match_element_wise, FilterProvider};

pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> DocketResult<bool> {
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// Matches when the field equals the value, or when an array field holds an
/// element equal to it.
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Value,
}

impl EqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }

    pub(crate) fn value(&self) -> &Value {
        &self.field_value
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(match_element_wise(&value, |v| v == &self.field_value))
    }

    fn has_field(&self) -> bool {
        true
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The negation of [EqualsFilter]. A document without the field matches.
pub(crate) struct NotEqualsFilter {
    field_name: String,
    field_value: Value,
}

impl NotEqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        NotEqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for NotEqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} != {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for NotEqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(!match_element_wise(&value, |v| v == &self.field_value))
    }

    fn has_field(&self) -> bool {
        true
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Matches on whether the field path is present. A field explicitly set to
/// null is present.
pub(crate) struct ExistsFilter {
    field_name: String,
    exists: bool,
}

impl ExistsFilter {
    pub(crate) fn new(field_name: String, exists: bool) -> Self {
        ExistsFilter { field_name, exists }
    }
}

impl Display for ExistsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exists {
            write!(f, "({} exists)", self.field_name)
        } else {
            write!(f, "({} not exists)", self.field_name)
        }
    }
}

impl FilterProvider for ExistsFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        Ok(entry.contains_field(&self.field_name) == self.exists)
    }

    fn has_field(&self) -> bool {
        true
    }

    fn field_name(&self) -> Option<&str> {
        Some(&self.field_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
