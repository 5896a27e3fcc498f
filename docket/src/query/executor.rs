use crate::collection::FindOptions;
use crate::common::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::all;
use crate::query::{enrich, Page, PageMeta, QueryPlan};
use crate::store::DocumentStore;
use crate::{SortOrder, SortableFields};

/// Paging and ordering applied when a plan leaves them unset.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefaults {
    pub page_size: u64,
    pub sort: SortableFields,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        QueryDefaults {
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortableFields::new(),
        }
    }
}

impl QueryDefaults {
    pub fn new(page_size: u64, sort_field: Option<(String, SortOrder)>) -> Self {
        let sort = match sort_field {
            Some((field, order)) => SortableFields::new().add_sorted_field(field, order),
            None => SortableFields::new(),
        };
        QueryDefaults { page_size, sort }
    }
}

/// Runs a [QueryPlan] against one collection of a [DocumentStore].
///
/// The total is counted before the window is read. Both reads go to the
/// store separately, so concurrent writes may make `total_count` and the
/// returned window disagree slightly.
pub struct QueryExecutor<'a> {
    store: &'a DocumentStore,
    defaults: &'a QueryDefaults,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a DocumentStore, defaults: &'a QueryDefaults) -> Self {
        QueryExecutor { store, defaults }
    }

    pub fn execute(&self, collection: &str, plan: &QueryPlan) -> DocketResult<Page> {
        let limit = self.effective_limit(plan)?;
        let skip = plan.get_skip();
        let sort = if plan.sort_fields().is_empty() {
            self.defaults.sort.clone()
        } else {
            plan.sort_fields().clone()
        };
        let filter = plan.get_filter().cloned().unwrap_or_else(all);

        let total_count = self.store.count(collection, &filter)?;
        let options = FindOptions::new().with_sort(sort).skip(skip).limit(limit);
        let mut documents = self.store.find_many(collection, &filter, &options)?;

        enrich(self.store, &mut documents, plan.lookups(), !plan.includes_inactive())?;

        if let Some(fields) = plan.projection() {
            documents = documents.iter().map(|doc| doc.project(fields)).collect();
        }

        let meta = PageMeta::compute(total_count, skip, limit, documents.len() as u64);
        log::debug!(
            "Listed {} of {} documents from {} (skip {}, limit {})",
            documents.len(),
            total_count,
            collection,
            skip,
            limit
        );
        Ok(Page::new(documents, meta))
    }

    fn effective_limit(&self, plan: &QueryPlan) -> DocketResult<u64> {
        let limit = plan.get_limit().unwrap_or(self.defaults.page_size);
        if limit == 0 {
            log::error!("Page limit must be at least 1");
            return Err(DocketError::new(
                "Page limit must be at least 1",
                ErrorKind::InvalidOperation,
            ));
        }
        if limit > MAX_PAGE_SIZE {
            log::warn!("Page limit {} capped at {}", limit, MAX_PAGE_SIZE);
            return Ok(MAX_PAGE_SIZE);
        }
        Ok(limit)
    }
}
