use crate::collection::Document;

/// Pagination metadata returned with every list result.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PageMeta {
    pub total_count: u64,
    pub skip: u64,
    pub limit: u64,
    /// 1-based page number of the window.
    pub page: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    /// Computes the metadata of a window of `returned` documents taken at
    /// `skip` with `limit` out of `total_count` matches.
    ///
    /// `limit` must be positive.
    pub fn compute(total_count: u64, skip: u64, limit: u64, returned: u64) -> PageMeta {
        let limit = limit.max(1);
        PageMeta {
            total_count,
            skip,
            limit,
            page: (skip / limit).saturating_add(1),
            total_pages: total_count.div_ceil(limit),
            has_next: skip.saturating_add(returned) < total_count,
            has_prev: skip > 0,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// One window of a list result.
#[derive(Debug, Clone)]
pub struct Page {
    documents: Vec<Document>,
    meta: PageMeta,
}

impl Page {
    pub fn new(documents: Vec<Document>, meta: PageMeta) -> Self {
        Page { documents, meta }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Renders `{ "data": [...], "meta": {...} }`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "data": self.documents.iter().map(Document::to_json).collect::<Vec<_>>(),
            "meta": self.meta.to_json(),
        })
    }
}
