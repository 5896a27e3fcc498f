use crate::{SortOrder, SortableFields};

/// Options for controlling store find operations.
///
/// `FindOptions` carries sorting and the skip/limit window. It is built with
/// method chaining or the convenience functions below.
///
/// ```rust,ignore
/// use docket::collection::{FindOptions, order_by};
/// use docket::SortOrder;
///
/// let options = FindOptions::new()
///     .sort_by("price", SortOrder::Descending)
///     .skip(10)
///     .limit(20);
///
/// let options = order_by("name", SortOrder::Ascending);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub(crate) sort_by: Option<SortableFields>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

/// Creates `FindOptions` with sorting by a field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates `FindOptions` that skips a number of results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` that limits the number of results.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions {
            sort_by: None,
            skip: None,
            limit: None,
        }
    }

    /// Adds a sort key. Keys added later break ties of earlier keys.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> Self {
        let fields = self.sort_by.take().unwrap_or_default();
        self.sort_by = Some(fields.add_sorted_field(field_name.to_string(), sort_order));
        self
    }

    /// Replaces all sort keys.
    pub fn with_sort(mut self, fields: SortableFields) -> Self {
        self.sort_by = if fields.is_empty() { None } else { Some(fields) };
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort_fields(&self) -> Option<&SortableFields> {
        self.sort_by.as_ref()
    }

    pub fn skip_count(&self) -> u64 {
        self.skip.unwrap_or(0)
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }
}
