use std::{any::Any, fmt::Display};

use crate::{collection::Document, errors::DocketResult, Value};

use super::{match_element_wise, FilterProvider};

/// Lower and upper limits of a range filter.
pub(crate) struct Bound {
    upper_bound: Value,
    lower_bound: Value,
    upper_inclusive: bool,
    lower_inclusive: bool,
}

impl Bound {
    pub(crate) fn inclusive(lower_bound: Value, upper_bound: Value) -> Self {
        Bound::new(lower_bound, upper_bound, true, true)
    }

    pub(crate) fn new(
        lower_bound: Value,
        upper_bound: Value,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Self {
        Bound {
            upper_bound,
            lower_bound,
            upper_inclusive,
            lower_inclusive,
        }
    }

    fn contains(&self, value: &Value) -> bool {
        if !value.is_comparable_with(&self.lower_bound) || !value.is_comparable_with(&self.upper_bound) {
            return false;
        }
        let above = if self.lower_inclusive {
            value >= &self.lower_bound
        } else {
            value > &self.lower_bound
        };
        let below = if self.upper_inclusive {
            value <= &self.upper_bound
        } else {
            value < &self.upper_bound
        };
        above && below
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComparisonMode {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonMode::Greater => write!(f, ">"),
            ComparisonMode::GreaterEqual => write!(f, ">="),
            ComparisonMode::Lesser => write!(f, "<"),
            ComparisonMode::LesserEqual => write!(f, "<="),
        }
    }
}

/// A single-sided range term.
///
/// Only values of the same type bracket compare: `price > 5` never matches a
/// string or a missing price.
pub(crate) struct ComparisonFilter {
    field_name: String,
    field_value: Value,
    comparison_mode: ComparisonMode,
}

impl ComparisonFilter {
    pub(crate) fn new(field_name: String, field_value: Value, comparison_mode: ComparisonMode) -> Self {
        ComparisonFilter {
            field_name,
            field_value,
            comparison_mode,
        }
    }

    fn compare(&self, value: &Value) -> bool {
        if !value.is_comparable_with(&self.field_value) {
            return false;
        }
        match self.comparison_mode {
            ComparisonMode::Greater => value > &self.field_value,
            ComparisonMode::GreaterEqual => value >= &self.field_value,
            ComparisonMode::Lesser => value < &self.field_value,
            ComparisonMode::LesserEqual => value <= &self.field_value,
        }
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field_name, self.comparison_mode, self.field_value)
    }
}

impl FilterProvider for ComparisonFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(match_element_wise(&value, |v| self.compare(v)))
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

pub(crate) struct BetweenFilter {
    field_name: String,
    bound: Bound,
}

impl BetweenFilter {
    pub(crate) fn new(field_name: String, bound: Bound) -> Self {
        BetweenFilter { field_name, bound }
    }
}

impl Display for BetweenFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = if self.bound.lower_inclusive { "[" } else { "(" };
        let close = if self.bound.upper_inclusive { "]" } else { ")" };
        write!(
            f,
            "({} in {}{}, {}{})",
            self.field_name, open, self.bound.lower_bound, self.bound.upper_bound, close
        )
    }
}

impl FilterProvider for BetweenFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(match_element_wise(&value, |v| self.bound.contains(v)))
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

/// Matches when the field value (or any element of an array field) is one of
/// the given values.
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl InFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        InFilter {
            field_name,
            field_values,
        }
    }

    pub(crate) fn values(&self) -> &[Value] {
        &self.field_values
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in {:?})", self.field_name, self.field_values)
    }
}

impl FilterProvider for InFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(match_element_wise(&value, |v| self.field_values.contains(v)))
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

pub(crate) struct NotInFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl NotInFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        NotInFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for NotInFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} not in {:?})", self.field_name, self.field_values)
    }
}

impl FilterProvider for NotInFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(!match_element_wise(&value, |v| self.field_values.contains(v)))
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
