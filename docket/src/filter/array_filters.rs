use std::{any::Any, fmt::Display};

use crate::{
    collection::Document,
    errors::DocketResult,
    Value,
};

use super::{Filter, FilterProvider};

fn as_elements(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Matches when an array field holds every one of the given values.
/// A scalar field is treated as a one-element array.
pub(crate) struct ContainsAllFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl ContainsAllFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        ContainsAllFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for ContainsAllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} contains all {:?})", self.field_name, self.field_values)
    }
}

impl FilterProvider for ContainsAllFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        let elements = as_elements(&value);
        if elements.is_empty() {
            return Ok(false);
        }
        Ok(self.field_values.iter().all(|wanted| elements.contains(&wanted)))
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

/// Matches when an array field holds at least one of the given values.
pub(crate) struct ContainsAnyFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl ContainsAnyFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        ContainsAnyFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for ContainsAnyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} contains any {:?})", self.field_name, self.field_values)
    }
}

impl FilterProvider for ContainsAnyFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        let elements = as_elements(&value);
        Ok(self.field_values.iter().any(|wanted| elements.contains(&wanted)))
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

/// Matches when at least one sub-document of an array field satisfies the
/// inner filter. Unlike dotted paths, all terms of the inner filter must hold
/// for the same element.
pub(crate) struct ElementMatchFilter {
    field_name: String,
    element_filter: Filter,
}

impl ElementMatchFilter {
    pub(crate) fn new(field_name: String, element_filter: Filter) -> Self {
        ElementMatchFilter {
            field_name,
            element_filter,
        }
    }
}

impl Display for ElementMatchFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} elemMatch {})", self.field_name, self.element_filter)
    }
}

impl FilterProvider for ElementMatchFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        if let Value::Array(items) = value {
            for item in items.iter() {
                if let Value::Document(doc) = item {
                    if self.element_filter.apply(doc)? {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
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
