use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::collection::{Document, DocumentId, FindOptions};
use crate::common::{Value, IS_ACTIVE};
use crate::errors::DocketResult;
use crate::filter::{and, by_ids, field};
use crate::store::DocumentStore;

/// Attaches referenced documents from another collection.
///
/// `local_field` holds either a single id or an array of ids of documents in
/// `from_collection`. The referenced documents are written to `target_field`:
/// a document (or null) for a single id, an array in reference order (with
/// null for dangling references) for an array of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub local_field: String,
    pub from_collection: String,
    pub target_field: String,
}

impl Lookup {
    pub fn new(local_field: &str, from_collection: &str, target_field: &str) -> Self {
        Lookup {
            local_field: local_field.to_string(),
            from_collection: from_collection.to_string(),
            target_field: target_field.to_string(),
        }
    }

    fn references(&self, document: &Document) -> Vec<DocumentId> {
        match document.get(&self.local_field) {
            Value::String(id) => DocumentId::parse(&id).into_iter().collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .filter_map(|id| DocumentId::parse(id).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn resolve(&self, document: &Document, found: &HashMap<String, Document>) -> Value {
        let lookup_one = |value: &Value| {
            value
                .as_str()
                .and_then(|id| found.get(id.trim()))
                .cloned()
                .map(Value::Document)
                .unwrap_or(Value::Null)
        };

        match document.get(&self.local_field) {
            Value::Array(items) => Value::Array(items.iter().map(lookup_one).collect()),
            single => lookup_one(&single),
        }
    }
}

/// Enriches `documents` in place.
///
/// Issues one query per referenced collection, no matter how many documents
/// or lookups point at it. With `active_only`, soft-deleted targets resolve
/// to null.
pub(crate) fn enrich(
    store: &DocumentStore,
    documents: &mut [Document],
    lookups: &[Lookup],
    active_only: bool,
) -> DocketResult<()> {
    if documents.is_empty() || lookups.is_empty() {
        return Ok(());
    }

    let mut resolved: HashMap<&str, HashMap<String, Document>> = HashMap::new();
    let by_collection = lookups.iter().into_group_map_by(|l| l.from_collection.as_str());

    for (collection, group) in by_collection {
        let mut seen = HashSet::new();
        let ids = documents
            .iter()
            .flat_map(|doc| group.iter().flat_map(move |lookup| lookup.references(doc)))
            .filter(|id| seen.insert(id.as_str().to_string()))
            .collect::<Vec<_>>();

        let mut found = HashMap::new();
        if !ids.is_empty() {
            let mut filter = by_ids(&ids);
            if active_only {
                filter = and(vec![filter, field(IS_ACTIVE).ne(false)]);
            }

            log::debug!("Resolving {} references into {}", ids.len(), collection);
            for doc in store.find_many(collection, &filter, &FindOptions::new())? {
                if let Some(id) = doc.id() {
                    found.insert(id.as_str().to_string(), doc);
                }
            }
        }
        resolved.insert(collection, found);
    }

    let empty = HashMap::new();
    for document in documents.iter_mut() {
        for lookup in lookups {
            let found = resolved.get(lookup.from_collection.as_str()).unwrap_or(&empty);
            let value = lookup.resolve(document, found);
            document.put(lookup.target_field.as_str(), value)?;
        }
    }
    Ok(())
}
