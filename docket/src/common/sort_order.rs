/// Specifies the direction for sorting documents.
///
/// Used with [`crate::query::QueryPlan::sort_by`] and
/// [`crate::collection::FindOptions::sort_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z, oldest to newest)
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A, newest to oldest)
    Descending,
}

impl SortOrder {
    /// Parses a sort key of the form `field` or `-field` (descending).
    pub fn parse_key(key: &str) -> (String, SortOrder) {
        match key.strip_prefix('-') {
            Some(field) => (field.to_string(), SortOrder::Descending),
            None => (key.trim_start_matches('+').to_string(), SortOrder::Ascending),
        }
    }
}
