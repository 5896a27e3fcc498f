use crate::collection::{Document, DocumentId, FindOptions};
use crate::common::{atomic, sort_documents, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::{id_lookup, Filter};
use crate::store::{StoreBackend, UpdateSpec, WriteResult};
use crate::Value;
use dashmap::DashMap;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct MemoryCollection {
    // insertion order is the natural order of the collection
    documents: IndexMap<String, Document>,
    unique_fields: Vec<String>,
}

impl MemoryCollection {
    fn matching_keys(&self, filter: &Filter) -> DocketResult<Vec<String>> {
        if let Some(ids) = id_lookup(filter) {
            let mut positions: Vec<usize> = ids
                .iter()
                .filter_map(|id| self.documents.get_index_of(id))
                .collect();
            positions.sort_unstable();
            positions.dedup();

            let mut keys = Vec::with_capacity(positions.len());
            for position in positions {
                if let Some((key, doc)) = self.documents.get_index(position) {
                    // the id filter still runs to honour every other term
                    if filter.apply(doc)? {
                        keys.push(key.clone());
                    }
                }
            }
            return Ok(keys);
        }

        let mut keys = Vec::new();
        for (key, doc) in self.documents.iter() {
            if filter.apply(doc)? {
                keys.push(key.clone());
            }
        }
        Ok(keys)
    }

    /// Fails with `Conflict` if `doc` repeats a unique value held by another
    /// document. `pending` holds values claimed earlier in the same batch.
    fn check_unique(
        &self,
        doc: &Document,
        own_key: &str,
        pending: &mut [HashSet<Value>],
    ) -> DocketResult<()> {
        for (position, field) in self.unique_fields.iter().enumerate() {
            let value = doc.get(field);
            if value.is_null() {
                continue;
            }
            let taken_in_store = self
                .documents
                .iter()
                .any(|(key, other)| key != own_key && other.get(field) == value);
            let taken_in_batch = !pending[position].insert(value.clone());
            if taken_in_store || taken_in_batch {
                log::error!("Duplicate value {} for unique field {}", value, field);
                return Err(DocketError::new(
                    &format!("Duplicate value {} for unique field {}", value, field),
                    ErrorKind::Conflict,
                ));
            }
        }
        Ok(())
    }

    fn pending_sets(&self) -> Vec<HashSet<Value>> {
        vec![HashSet::new(); self.unique_fields.len()]
    }
}

struct InMemoryStoreInner {
    name: String,
    collections: DashMap<String, Atomic<MemoryCollection>>,
    online: AtomicBool,
    closed: AtomicBool,
}

/// A document store held in process memory.
///
/// Each collection sits behind its own read-write lock, so writes to one
/// document are linearizable while different collections proceed in
/// parallel. [`InMemoryStore::set_online`] simulates a network partition.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new(name: &str) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner {
                name: name.to_string(),
                collections: DashMap::new(),
                online: AtomicBool::new(true),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Marks the store reachable or unreachable.
    pub fn set_online(&self, online: bool) {
        log::info!("In-memory store {} is now {}", self.inner.name, if online { "online" } else { "offline" });
        self.inner.online.store(online, Ordering::SeqCst);
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn drop_collection(&self, collection: &str) {
        self.inner.collections.remove(collection);
    }

    fn ensure_reachable(&self) -> DocketResult<()> {
        if self.is_reachable() {
            Ok(())
        } else {
            log::error!("In-memory store {} is unreachable", self.inner.name);
            Err(DocketError::new(
                &format!("Store {} is unreachable", self.inner.name),
                ErrorKind::StorageUnavailable,
            ))
        }
    }

    fn collection(&self, name: &str) -> Atomic<MemoryCollection> {
        self.inner
            .collections
            .entry(name.to_string())
            .or_insert_with(|| atomic(MemoryCollection::default()))
            .clone()
    }

    fn existing(&self, name: &str) -> Option<Atomic<MemoryCollection>> {
        self.inner.collections.get(name).map(|entry| entry.value().clone())
    }
}

impl StoreBackend for InMemoryStore {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn open_connection(&self) -> DocketResult<()> {
        if self.is_reachable() {
            Ok(())
        } else {
            Err(DocketError::new(
                &format!("Store {} refused the connection", self.inner.name),
                ErrorKind::ConnectionError,
            ))
        }
    }

    fn is_reachable(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst) && !self.inner.closed.load(Ordering::SeqCst)
    }

    fn insert(&self, collection: &str, documents: Vec<Document>) -> DocketResult<WriteResult> {
        self.ensure_reachable()?;
        self.collection(collection).write_with(|coll| {
            let mut pending = coll.pending_sets();
            let mut batch_ids = HashSet::with_capacity(documents.len());
            let mut staged = Vec::with_capacity(documents.len());

            for mut doc in documents {
                let id = doc.ensure_id();
                let key = id.as_str().to_string();
                if coll.documents.contains_key(&key) || !batch_ids.insert(key.clone()) {
                    log::error!("Document with id {} already exists in {}", id, collection);
                    return Err(DocketError::new(
                        &format!("Document with id {} already exists", id),
                        ErrorKind::Conflict,
                    ));
                }
                coll.check_unique(&doc, &key, &mut pending)?;
                staged.push((key, id, doc));
            }

            let mut ids = Vec::with_capacity(staged.len());
            for (key, id, doc) in staged {
                coll.documents.insert(key, doc);
                ids.push(id);
            }
            Ok(WriteResult::inserted(ids))
        })
    }

    fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> DocketResult<Vec<Document>> {
        self.ensure_reachable()?;
        let coll = match self.existing(collection) {
            Some(coll) => coll,
            None => return Ok(Vec::new()),
        };

        let mut documents = coll.read_with(|coll| -> DocketResult<Vec<Document>> {
            let keys = coll.matching_keys(filter)?;
            Ok(keys
                .iter()
                .filter_map(|key| coll.documents.get(key).cloned())
                .collect())
        })?;

        if let Some(sort_by) = options.sort_fields() {
            sort_documents(&mut documents, sort_by);
        }

        let skip = usize::try_from(options.skip_count()).unwrap_or(usize::MAX);
        let limit = options
            .limit_count()
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(documents.into_iter().skip(skip).take(limit).collect())
    }

    fn count(&self, collection: &str, filter: &Filter) -> DocketResult<u64> {
        self.ensure_reachable()?;
        match self.existing(collection) {
            Some(coll) => coll.read_with(|coll| coll.matching_keys(filter).map(|keys| keys.len() as u64)),
            None => Ok(0),
        }
    }

    fn update(&self, collection: &str, filter: &Filter, update: &UpdateSpec, multi: bool) -> DocketResult<WriteResult> {
        self.ensure_reachable()?;
        let coll = match self.existing(collection) {
            Some(coll) => coll,
            None => return Ok(WriteResult::updated(0, 0)),
        };

        coll.write_with(|coll| {
            let mut keys = coll.matching_keys(filter)?;
            if !multi {
                keys.truncate(1);
            }

            let mut pending = coll.pending_sets();
            let mut staged = Vec::new();
            for key in keys.iter() {
                let mut candidate = match coll.documents.get(key) {
                    Some(doc) => doc.clone(),
                    None => continue,
                };
                if update.apply(&mut candidate)? {
                    coll.check_unique(&candidate, key, &mut pending)?;
                    staged.push((key.clone(), candidate));
                }
            }

            let modified = staged.len() as u64;
            for (key, doc) in staged {
                if let Some(slot) = coll.documents.get_mut(&key) {
                    *slot = doc;
                }
            }
            Ok(WriteResult::updated(keys.len() as u64, modified))
        })
    }

    fn delete(&self, collection: &str, filter: &Filter, multi: bool) -> DocketResult<WriteResult> {
        self.ensure_reachable()?;
        let coll = match self.existing(collection) {
            Some(coll) => coll,
            None => return Ok(WriteResult::deleted(0)),
        };

        coll.write_with(|coll| {
            let mut keys = coll.matching_keys(filter)?;
            if !multi {
                keys.truncate(1);
            }
            for key in keys.iter() {
                coll.documents.shift_remove(key);
            }
            Ok(WriteResult::deleted(keys.len() as u64))
        })
    }

    fn ensure_unique(&self, collection: &str, field: &str) -> DocketResult<()> {
        self.ensure_reachable()?;
        self.collection(collection).write_with(|coll| {
            if coll.unique_fields.iter().any(|f| f == field) {
                return Ok(());
            }

            let mut seen = HashSet::new();
            for doc in coll.documents.values() {
                let value = doc.get(field);
                if !value.is_null() && !seen.insert(value.clone()) {
                    log::error!("Cannot make {} unique, duplicate value {}", field, value);
                    return Err(DocketError::new(
                        &format!("Cannot make {} unique, duplicate value {}", field, value),
                        ErrorKind::Conflict,
                    ));
                }
            }
            coll.unique_fields.push(field.to_string());
            Ok(())
        })
    }

    fn close(&self) -> DocketResult<()> {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            log::debug!("In-memory store {} closed", self.inner.name);
        }
        Ok(())
    }
}
