use crate::collection::Document;
use crate::{SortOrder, SortableFields};
use std::cmp::Ordering;

/// Sorts documents in place by the given keys.
///
/// The sort is stable, so documents that compare equal on every key keep
/// their incoming (insertion) order. A document without the sort field reads
/// it as [`crate::Value::Null`], the minimum of every type: it comes first in
/// ascending order and last in descending order.
pub fn sort_documents(documents: &mut [Document], sort_by: &SortableFields) {
    if sort_by.is_empty() {
        return;
    }

    documents.sort_by(|a, b| compare_documents(a, b, sort_by));
}

/// Compares two documents key by key; the first non-equal key decides.
pub fn compare_documents(a: &Document, b: &Document, sort_by: &SortableFields) -> Ordering {
    for (field, order) in sort_by.sorting_order() {
        let a_value = a.get(field);
        let b_value = b.get(field);

        let cmp = a_value.cmp(&b_value);
        if cmp != Ordering::Equal {
            return match order {
                SortOrder::Ascending => cmp,
                SortOrder::Descending => cmp.reverse(),
            };
        }
    }
    Ordering::Equal
}
