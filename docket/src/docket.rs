use std::sync::Arc;

use crate::docket_builder::DocketBuilder;
use crate::docket_config::DocketConfig;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::repository::{Entity, EntityRepository, Repository};
use crate::store::{DocumentStore, StoreBackend};
use crate::validation::Schema;

/// The entry point of the data-access layer.
///
/// A `Docket` owns one [DocumentStore] connection and hands out repositories
/// over it. It is constructed explicitly and passed to whoever needs it;
/// clones share the same store. Closing it (or dropping the last clone)
/// releases the connection pool.
///
/// ```rust,ignore
/// let docket = Docket::builder().store_address("memory://shop").open()?;
/// let products = docket.repository("products", product_schema())?;
/// let page = products.list(&QueryPlan::new().page(1, 20))?;
/// docket.close()?;
/// ```
#[derive(Clone)]
pub struct Docket {
    inner: Arc<DocketInner>,
}

struct DocketInner {
    config: DocketConfig,
    store: DocumentStore,
}

impl std::fmt::Debug for Docket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Docket")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Docket {
    pub fn builder() -> DocketBuilder {
        DocketBuilder::new()
    }

    pub(crate) fn open(config: DocketConfig, backend: Option<Arc<dyn StoreBackend>>) -> DocketResult<Docket> {
        let store_config = config.store_config().clone();
        let store = match backend {
            Some(backend) => DocumentStore::connect_with_backend(store_config, backend)?,
            None => DocumentStore::connect(store_config)?,
        };
        log::info!("Docket opened on {}", config.store_config().get_address());
        Ok(Docket {
            inner: Arc::new(DocketInner { config, store }),
        })
    }

    /// A repository over the `name` collection, validated by `schema`.
    pub fn repository(&self, name: &str, schema: Schema) -> DocketResult<Repository> {
        self.check_open()?;
        Repository::new(
            name,
            self.inner.store.clone(),
            schema,
            self.inner.config.query_defaults(),
        )
    }

    /// A typed repository for `T`.
    pub fn entity_repository<T: Entity>(&self) -> DocketResult<EntityRepository<T>> {
        let repository = self.repository(&T::collection_name(), T::schema())?;
        Ok(EntityRepository::new(repository))
    }

    pub fn config(&self) -> &DocketConfig {
        &self.inner.config
    }

    /// The underlying store handle, for direct primitive access.
    pub fn store(&self) -> DocumentStore {
        self.inner.store.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.store.is_closed()
    }

    /// Closes the store. Repositories handed out earlier fail with
    /// `StorageUnavailable` afterwards. Closing twice is a no-op.
    pub fn close(&self) -> DocketResult<()> {
        self.inner.store.close()?;
        log::info!("Docket closed");
        Ok(())
    }

    fn check_open(&self) -> DocketResult<()> {
        if self.is_closed() {
            log::error!("Docket is closed");
            return Err(DocketError::new("Docket is closed", ErrorKind::StorageUnavailable));
        }
        Ok(())
    }
}
