use regex::Regex;
use std::{any::Any, fmt::Display};

use crate::{
    collection::Document,
    errors::{DocketError, DocketResult, ErrorKind},
    Value,
};

use super::{match_element_wise, FilterProvider};

/// Matches string fields (or string elements of an array field) against a
/// regular expression.
///
/// An invalid pattern does not fail construction; the filter reports a
/// `FilterError` when it is applied.
pub(crate) struct RegexFilter {
    field_name: String,
    field_value: String,
    pattern: Option<Regex>,
}

impl RegexFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: String) -> Self {
        let pattern = match Regex::new(&field_value) {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::error!("Invalid regex pattern '{}': {}", field_value, e);
                None
            }
        };

        RegexFilter {
            field_name,
            field_value,
            pattern,
        }
    }
}

impl Display for RegexFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} =~ {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for RegexFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        match &self.pattern {
            Some(p) => {
                let value = entry.get(&self.field_name);
                Ok(match_element_wise(&value, |v| {
                    v.as_str().map(|s| p.is_match(s)).unwrap_or(false)
                }))
            }
            None => {
                log::error!("Invalid regex pattern for filter {}", self);
                Err(DocketError::new(
                    &format!("Invalid regex pattern '{}'", self.field_value),
                    ErrorKind::FilterError,
                ))
            }
        }
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

/// Case-sensitive substring match on string fields.
pub(crate) struct ContainsFilter {
    field_name: String,
    needle: String,
}

impl ContainsFilter {
    pub(crate) fn new(field_name: String, needle: String) -> Self {
        ContainsFilter { field_name, needle }
    }
}

impl Display for ContainsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} contains \"{}\")", self.field_name, self.needle)
    }
}

impl FilterProvider for ContainsFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(match_element_wise(&value, |v: &Value| {
            v.as_str().map(|s| s.contains(self.needle.as_str())).unwrap_or(false)
        }))
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
