use crate::Value;

use super::{
    BetweenFilter, Bound, ComparisonFilter, ComparisonMode, ContainsAllFilter, ContainsAnyFilter,
    ContainsFilter, ElementMatchFilter, EqualsFilter, ExistsFilter, Filter, InFilter,
    NotEqualsFilter, NotInFilter, RegexFilter,
};

/// Creates a fluent filter builder for the specified field.
///
/// The field may be a dot path (`address.city`, `variants.0.sku`).
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for filters on one field.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    /// Matches documents where the field differs from the value, including
    /// documents without the field.
    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(NotEqualsFilter::new(self.field_name, value.into()))
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::Greater))
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::GreaterEqual))
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::Lesser))
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value.into(), ComparisonMode::LesserEqual))
    }

    /// Matches values within `[lower_bound, upper_bound]`.
    pub fn between_inclusive<T: Into<Value>>(self, lower_bound: T, upper_bound: T) -> Filter {
        Filter::new(BetweenFilter::new(
            self.field_name,
            Bound::inclusive(lower_bound.into(), upper_bound.into()),
        ))
    }

    /// Matches values within a range with independent bound inclusivity.
    pub fn between<T: Into<Value>>(
        self,
        lower_bound: T,
        upper_bound: T,
        lower_inclusive: bool,
        upper_inclusive: bool,
    ) -> Filter {
        Filter::new(BetweenFilter::new(
            self.field_name,
            Bound::new(
                lower_bound.into(),
                upper_bound.into(),
                lower_inclusive,
                upper_inclusive,
            ),
        ))
    }

    /// Case-sensitive substring match.
    #[inline]
    pub fn contains(self, value: &str) -> Filter {
        Filter::new(ContainsFilter::new(self.field_name, value.to_string()))
    }

    /// Regular expression match. An invalid pattern fails when the filter is
    /// applied.
    #[inline]
    pub fn regex(self, pattern: &str) -> Filter {
        Filter::new(RegexFilter::new(self.field_name, pattern.to_string()))
    }

    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        Filter::new(InFilter::new(
            self.field_name,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn not_in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        Filter::new(NotInFilter::new(
            self.field_name,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn contains_all<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        Filter::new(ContainsAllFilter::new(
            self.field_name,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn contains_any<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        Filter::new(ContainsAnyFilter::new(
            self.field_name,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn exists(self, exists: bool) -> Filter {
        Filter::new(ExistsFilter::new(self.field_name, exists))
    }

    /// Matches arrays of sub-documents where one element satisfies `filter`.
    pub fn elem_match(self, filter: Filter) -> Filter {
        Filter::new(ElementMatchFilter::new(self.field_name, filter))
    }
}
