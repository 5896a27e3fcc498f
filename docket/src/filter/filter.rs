use crate::collection::{Document, DocumentId};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::{Value, DOC_ID};
use std::any::Any;
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use super::{AllFilter, AndFilter, EqualsFilter, InFilter, NotFilter, OrFilter};

/// A predicate over documents.
///
/// Implementations are immutable once built and shared between threads
/// through [Filter].
pub trait FilterProvider: Any + Send + Sync + Display {
    /// Evaluates the filter against a document.
    fn apply(&self, entry: &Document) -> DocketResult<bool>;

    #[inline]
    fn has_field(&self) -> bool {
        false
    }

    /// The field the filter targets, for field-level filters.
    fn field_name(&self) -> Option<&str> {
        None
    }

    /// The sub-filters of a logical filter.
    fn logical_filters(&self) -> DocketResult<Vec<Filter>> {
        log::error!("Filter {} is not a logical filter", self);
        Err(DocketError::new(
            "Filter is not a logical filter",
            ErrorKind::FilterError,
        ))
    }

    fn as_any(&self) -> &dyn Any;
}

/// A shareable, cloneable filter.
///
/// ```rust,ignore
/// use docket::filter::field;
///
/// let filter = field("price").gt(10).and(field("stock").gt(0));
/// assert!(filter.apply(&doc!{ price: 12, stock: 3 })?);
/// ```
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter {
            inner: Arc::new(inner),
        }
    }

    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }

    pub fn not(&self) -> Self {
        Filter::new(NotFilter::new(self.clone()))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Matches every document.
pub fn all() -> Filter {
    Filter::new(AllFilter {})
}

/// Matches the document with the given id.
pub fn by_id(id: &DocumentId) -> Filter {
    Filter::new(EqualsFilter::new(DOC_ID.to_string(), Value::from(id)))
}

/// Matches documents whose id is one of `ids`.
pub fn by_ids(ids: &[DocumentId]) -> Filter {
    Filter::new(InFilter::new(
        DOC_ID.to_string(),
        ids.iter().map(Value::from).collect(),
    ))
}

/// Matches documents matching every filter. An empty list matches everything.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Matches documents matching at least one filter. An empty list matches nothing.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

pub fn not(filter: Filter) -> Filter {
    Filter::new(NotFilter::new(filter))
}

pub(crate) fn is_all_filter(filter: &Filter) -> bool {
    filter.as_any().is::<AllFilter>()
}

/// The ids a filter selects when it is an id lookup, alone or as a term of
/// an AND. The result is a superset; callers still apply the whole filter.
pub(crate) fn id_lookup(filter: &Filter) -> Option<Vec<String>> {
    if let Some(and_filter) = filter.as_any().downcast_ref::<AndFilter>() {
        return and_filter
            .logical_filters()
            .ok()?
            .iter()
            .find_map(id_lookup);
    }
    if let Some(equals) = filter.as_any().downcast_ref::<EqualsFilter>() {
        if equals.field_name() == Some(DOC_ID) {
            return equals.value().as_str().map(|id| vec![id.to_string()]);
        }
    }
    if let Some(in_filter) = filter.as_any().downcast_ref::<InFilter>() {
        if in_filter.field_name() == Some(DOC_ID) {
            return Some(
                in_filter
                    .values()
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            );
        }
    }
    None
}

/// Applies a predicate to a field value, and to each element when the value
/// is an array.
#[inline]
pub(crate) fn match_element_wise(value: &Value, predicate: impl Fn(&Value) -> bool) -> bool {
    if predicate(value) {
        return true;
    }
    match value {
        Value::Array(items) => items.iter().any(predicate),
        _ => false,
    }
}
