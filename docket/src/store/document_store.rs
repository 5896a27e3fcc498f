use crate::collection::{Document, DocumentId, FindOptions};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::Filter;
use crate::store::memory::InMemoryStore;
use crate::store::{ConnectionPool, PoolOptions, StoreConfig, UpdateSpec, WriteResult};
use crate::MEMORY_SCHEME;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The primitives a document store backend provides.
///
/// Every method is atomic at the level of a single document. Implementations
/// must be safe to call from many threads at once.
pub trait StoreBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Establishes one new session with the backend.
    fn open_connection(&self) -> DocketResult<()>;

    fn is_reachable(&self) -> bool;

    /// Inserts all documents or none, assigning ids to those without one.
    fn insert(&self, collection: &str, documents: Vec<Document>) -> DocketResult<WriteResult>;

    fn find(&self, collection: &str, filter: &Filter, options: &FindOptions) -> DocketResult<Vec<Document>>;

    fn count(&self, collection: &str, filter: &Filter) -> DocketResult<u64>;

    /// Applies `update` to the first match, or to every match when `multi`.
    fn update(&self, collection: &str, filter: &Filter, update: &UpdateSpec, multi: bool) -> DocketResult<WriteResult>;

    fn delete(&self, collection: &str, filter: &Filter, multi: bool) -> DocketResult<WriteResult>;

    /// Declares a field whose non-null values must be unique in the collection.
    fn ensure_unique(&self, collection: &str, field: &str) -> DocketResult<()>;

    fn close(&self) -> DocketResult<()>;
}

struct DocumentStoreInner {
    config: StoreConfig,
    backend: Arc<dyn StoreBackend>,
    pool: ConnectionPool,
    closed: AtomicBool,
    // set when the backend was created by `connect` and is not shared
    owns_backend: bool,
}

impl Drop for DocumentStoreInner {
    fn drop(&mut self) {
        self.pool.close();
        if self.owns_backend {
            let _ = self.backend.close();
        }
    }
}

/// A connection-pooled handle to a document store.
///
/// Handles are cheap to clone and share one pool. Every primitive checks out
/// a connection for its duration; once the store is closed every primitive
/// fails with `StorageUnavailable`.
///
/// ```rust,ignore
/// let store = DocumentStore::connect(StoreConfig::new().address("memory://shop"))?;
/// let result = store.insert_one("products", doc!{ name: "Widget", price: 10 })?;
/// let found = store.find_one("products", &by_id(&result.inserted_ids()[0]))?;
/// store.close()?;
/// ```
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<DocumentStoreInner>,
}

impl DocumentStore {
    /// Connects to the store named by `config.address`.
    ///
    /// `memory://<name>` selects a fresh in-memory backend. Use
    /// [connect_with_backend](DocumentStore::connect_with_backend) to share a
    /// backend between handles.
    ///
    /// # Errors
    ///
    /// `ConnectionError` for an unsupported address scheme, an empty database
    /// name, or a backend that cannot open the minimum pool size in time.
    pub fn connect(config: StoreConfig) -> DocketResult<DocumentStore> {
        let address = config.get_address().to_string();
        let backend: Arc<dyn StoreBackend> = match address.strip_prefix(MEMORY_SCHEME) {
            Some(name) if !name.is_empty() => Arc::new(InMemoryStore::new(name)),
            _ => {
                log::error!("Unsupported store address {}", address);
                return Err(DocketError::new(
                    &format!("Unsupported store address {}", address),
                    ErrorKind::ConnectionError,
                ));
            }
        };
        DocumentStore::open(config, backend, true)
    }

    /// Connects through an existing backend.
    ///
    /// The backend may be shared with other handles, so closing this store
    /// leaves it open.
    pub fn connect_with_backend(config: StoreConfig, backend: Arc<dyn StoreBackend>) -> DocketResult<DocumentStore> {
        DocumentStore::open(config, backend, false)
    }

    fn open(config: StoreConfig, backend: Arc<dyn StoreBackend>, owns_backend: bool) -> DocketResult<DocumentStore> {
        config.validate().map_err(|err| {
            DocketError::new_with_cause("Invalid store configuration", ErrorKind::ConnectionError, err)
        })?;

        let pool = ConnectionPool::open(
            backend.clone(),
            PoolOptions {
                min_size: config.min_pool_size(),
                max_size: config.max_pool_size(),
                connect_timeout: config.get_connect_timeout(),
                checkout_timeout: config.get_socket_timeout(),
            },
        )?;

        log::info!(
            "Connected to {} (database {}, pool {}..{})",
            backend.name(),
            config.get_database(),
            config.min_pool_size(),
            config.max_pool_size()
        );
        Ok(DocumentStore {
            inner: Arc::new(DocumentStoreInner {
                config,
                backend,
                pool,
                closed: AtomicBool::new(false),
                owns_backend,
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.inner.pool
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Inserts one document and reports its id in `inserted_ids`.
    pub fn insert_one(&self, collection: &str, document: Document) -> DocketResult<WriteResult> {
        self.with_connection(|backend| backend.insert(collection, vec![document]))
    }

    /// Inserts all documents or none.
    pub fn insert_many(&self, collection: &str, documents: Vec<Document>) -> DocketResult<WriteResult> {
        if documents.is_empty() {
            return Ok(WriteResult::inserted(Vec::new()));
        }
        self.with_connection(|backend| backend.insert(collection, documents))
    }

    pub fn find_one(&self, collection: &str, filter: &Filter) -> DocketResult<Option<Document>> {
        let options = FindOptions::new().limit(1);
        self.with_connection(|backend| backend.find(collection, filter, &options))
            .map(|mut docs| docs.pop())
    }

    pub fn find_by_id(&self, collection: &str, id: &DocumentId) -> DocketResult<Option<Document>> {
        self.find_one(collection, &crate::filter::by_id(id))
    }

    pub fn find_many(&self, collection: &str, filter: &Filter, options: &FindOptions) -> DocketResult<Vec<Document>> {
        self.with_connection(|backend| backend.find(collection, filter, options))
    }

    pub fn count(&self, collection: &str, filter: &Filter) -> DocketResult<u64> {
        self.with_connection(|backend| backend.count(collection, filter))
    }

    pub fn update_one(&self, collection: &str, filter: &Filter, update: &UpdateSpec) -> DocketResult<WriteResult> {
        self.with_connection(|backend| backend.update(collection, filter, update, false))
    }

    pub fn update_many(&self, collection: &str, filter: &Filter, update: &UpdateSpec) -> DocketResult<WriteResult> {
        self.with_connection(|backend| backend.update(collection, filter, update, true))
    }

    pub fn delete_one(&self, collection: &str, filter: &Filter) -> DocketResult<WriteResult> {
        self.with_connection(|backend| backend.delete(collection, filter, false))
    }

    pub fn delete_many(&self, collection: &str, filter: &Filter) -> DocketResult<WriteResult> {
        self.with_connection(|backend| backend.delete(collection, filter, true))
    }

    pub fn ensure_unique(&self, collection: &str, field: &str) -> DocketResult<()> {
        self.with_connection(|backend| backend.ensure_unique(collection, field))
    }

    /// Releases pooled connections, and the backend itself when `connect`
    /// created it. Calling it again is a no-op.
    pub fn close(&self) -> DocketResult<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.pool.close();
        if self.inner.owns_backend {
            self.inner.backend.close()?;
        }
        log::info!("Store client for {} closed", self.inner.backend.name());
        Ok(())
    }

    fn with_connection<R>(&self, op: impl FnOnce(&dyn StoreBackend) -> DocketResult<R>) -> DocketResult<R> {
        if self.is_closed() {
            log::error!("Store client for {} is closed", self.inner.backend.name());
            return Err(DocketError::new(
                "Store client is closed",
                ErrorKind::StorageUnavailable,
            ));
        }

        let connection = self.inner.pool.checkout()?;
        if !connection.backend().is_reachable() {
            log::error!("Store {} is unreachable", connection.backend().name());
            return Err(DocketError::new(
                &format!("Store {} is unreachable", connection.backend().name()),
                ErrorKind::StorageUnavailable,
            ));
        }
        op(connection.backend())
    }
}
