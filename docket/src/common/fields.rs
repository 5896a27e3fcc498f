use crate::SortOrder;

/// An ordered list of sort keys. Earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortableFields {
    sorting_order: Vec<(String, SortOrder)>,
}

impl SortableFields {
    pub fn new() -> Self {
        SortableFields {
            sorting_order: Vec::new(),
        }
    }

    /// Appends a sort key. A key for a field already present is replaced in place.
    pub fn add_sorted_field(mut self, field_name: String, sort_order: SortOrder) -> Self {
        match self.sorting_order.iter_mut().find(|(name, _)| *name == field_name) {
            Some(existing) => existing.1 = sort_order,
            None => self.sorting_order.push((field_name, sort_order)),
        }
        self
    }

    pub fn sorting_order(&self) -> &[(String, SortOrder)] {
        &self.sorting_order
    }

    pub fn is_empty(&self) -> bool {
        self.sorting_order.is_empty()
    }
}
