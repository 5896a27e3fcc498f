use std::sync::Arc;
use std::time::Duration;

use crate::docket::Docket;
use crate::docket_config::DocketConfig;
use crate::errors::{DocketError, DocketResult};
use crate::store::{StoreBackend, StoreConfig};

/// Builder for a [Docket] instance.
///
/// Setters never fail on their own: the first invalid value is kept and
/// returned by [open](DocketBuilder::open).
///
/// ```rust,ignore
/// let docket = Docket::builder()
///     .store_address("memory://shop")
///     .pool_size(1, 4)
///     .default_page_size(50)
///     .default_sort("-created_at")
///     .open()?;
/// ```
#[derive(Default)]
pub struct DocketBuilder {
    error: Option<DocketError>,
    config: DocketConfig,
    backend: Option<Arc<dyn StoreBackend>>,
}

impl DocketBuilder {
    pub fn new() -> Self {
        DocketBuilder::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: DocketConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the configuration from `DOCKET_*` environment variables.
    pub fn from_env(self) -> Self {
        self.try_update(|_| DocketConfig::from_env())
    }

    pub fn store_address(self, address: &str) -> Self {
        self.update_store(|store| store.address(address))
    }

    pub fn database(self, database: &str) -> Self {
        self.update_store(|store| store.database(database))
    }

    pub fn pool_size(self, min: usize, max: usize) -> Self {
        self.update_store(|store| store.pool_size(min, max))
    }

    pub fn connect_timeout(self, timeout: Duration) -> Self {
        self.update_store(|store| store.connect_timeout(timeout))
    }

    pub fn socket_timeout(self, timeout: Duration) -> Self {
        self.update_store(|store| store.socket_timeout(timeout))
    }

    pub fn default_page_size(self, size: u64) -> Self {
        self.try_update(|config| config.with_default_page_size(size))
    }

    /// `field` sorts ascending, `-field` descending.
    pub fn default_sort(self, key: &str) -> Self {
        self.try_update(|config| config.with_default_sort(key))
    }

    /// Uses an existing backend instead of resolving the store address.
    pub fn backend(mut self, backend: Arc<dyn StoreBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Connects to the store and opens the instance.
    ///
    /// # Errors
    ///
    /// The first error captured by a setter, otherwise the connection error.
    pub fn open(self) -> DocketResult<Docket> {
        if let Some(err) = self.error {
            log::error!("Docket configuration is invalid: {}", err);
            return Err(err);
        }
        Docket::open(self.config, self.backend)
    }

    fn update_store(mut self, update: impl FnOnce(StoreConfig) -> StoreConfig) -> Self {
        let store = update(self.config.store_config().clone());
        self.config = self.config.with_store_config(store);
        self
    }

    fn try_update(mut self, update: impl FnOnce(DocketConfig) -> DocketResult<DocketConfig>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match update(self.config.clone()) {
            Ok(config) => self.config = config,
            Err(err) => self.error = Some(err),
        }
        self
    }
}
