use std::time::Duration;

use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::query::QueryDefaults;
use crate::store::StoreConfig;
use crate::{SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const ENV_STORE_ADDRESS: &str = "DOCKET_STORE_ADDRESS";
pub const ENV_DATABASE: &str = "DOCKET_DATABASE";
pub const ENV_POOL_MIN_SIZE: &str = "DOCKET_POOL_MIN_SIZE";
pub const ENV_POOL_MAX_SIZE: &str = "DOCKET_POOL_MAX_SIZE";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "DOCKET_CONNECT_TIMEOUT_MS";
pub const ENV_SOCKET_TIMEOUT_MS: &str = "DOCKET_SOCKET_TIMEOUT_MS";
pub const ENV_DEFAULT_PAGE_SIZE: &str = "DOCKET_DEFAULT_PAGE_SIZE";
pub const ENV_DEFAULT_SORT: &str = "DOCKET_DEFAULT_SORT";

/// Configuration of a [Docket](crate::docket::Docket) instance.
///
/// Built once, before the instance opens, and immutable afterwards. Values
/// come from code through [DocketBuilder](crate::docket_builder::DocketBuilder)
/// or from `DOCKET_*` environment variables through [DocketConfig::from_env].
#[derive(Debug, Clone, PartialEq)]
pub struct DocketConfig {
    store: StoreConfig,
    default_page_size: u64,
    default_sort: Option<(String, SortOrder)>,
}

impl Default for DocketConfig {
    fn default() -> Self {
        DocketConfig {
            store: StoreConfig::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            default_sort: None,
        }
    }
}

impl DocketConfig {
    pub fn new() -> Self {
        DocketConfig::default()
    }

    /// Reads the configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError` naming the variable when a value is malformed.
    pub fn from_env() -> DocketResult<DocketConfig> {
        DocketConfig::from_vars(std::env::vars())
    }

    /// Reads the configuration from `(name, value)` pairs shaped like the
    /// process environment. Names other than the `DOCKET_*` variables are
    /// ignored.
    pub fn from_vars<I, K, V>(vars: I) -> DocketResult<DocketConfig>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = DocketConfig::new();
        let mut store = StoreConfig::new();
        let mut min_pool = store.min_pool_size();
        let mut max_pool = store.max_pool_size();

        for (name, value) in vars {
            let (name, value) = (name.as_ref(), value.as_ref().trim());
            match name {
                ENV_STORE_ADDRESS => store = store.address(value),
                ENV_DATABASE => store = store.database(value),
                ENV_POOL_MIN_SIZE => min_pool = parse_number(name, value)?,
                ENV_POOL_MAX_SIZE => max_pool = parse_number(name, value)?,
                ENV_CONNECT_TIMEOUT_MS => {
                    store = store.connect_timeout(Duration::from_millis(parse_number(name, value)?))
                }
                ENV_SOCKET_TIMEOUT_MS => {
                    store = store.socket_timeout(Duration::from_millis(parse_number(name, value)?))
                }
                ENV_DEFAULT_PAGE_SIZE => config = config.with_default_page_size(parse_number(name, value)?)?,
                ENV_DEFAULT_SORT => config = config.with_default_sort(value)?,
                _ => {}
            }
        }

        config.store = store.pool_size(min_pool, max_pool);
        config.store.validate()?;
        log::debug!("Loaded configuration {:?}", config);
        Ok(config)
    }

    pub fn store_config(&self) -> &StoreConfig {
        &self.store
    }

    pub fn default_page_size(&self) -> u64 {
        self.default_page_size
    }

    pub fn default_sort(&self) -> Option<&(String, SortOrder)> {
        self.default_sort.as_ref()
    }

    pub fn with_store_config(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Sets the page size used when a query plan has no limit.
    ///
    /// # Errors
    ///
    /// `ConfigError` unless `1 <= size <= MAX_PAGE_SIZE`.
    pub fn with_default_page_size(mut self, size: u64) -> DocketResult<Self> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(config_error(&format!(
                "Default page size must be between 1 and {}, found {}",
                MAX_PAGE_SIZE, size
            )));
        }
        self.default_page_size = size;
        Ok(self)
    }

    /// Sets the sort used when a query plan has none: `field` sorts
    /// ascending, `-field` descending.
    pub fn with_default_sort(mut self, key: &str) -> DocketResult<Self> {
        let (field, order) = SortOrder::parse_key(key.trim());
        if field.trim().is_empty() {
            return Err(config_error(&format!("Invalid default sort '{}'", key)));
        }
        self.default_sort = Some((field, order));
        Ok(self)
    }

    /// The paging and ordering repositories fall back on.
    pub fn query_defaults(&self) -> QueryDefaults {
        QueryDefaults::new(self.default_page_size, self.default_sort.clone())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> DocketResult<T> {
    value
        .parse::<T>()
        .map_err(|_| config_error(&format!("{} must be a non-negative integer, found '{}'", name, value)))
}

fn config_error(message: &str) -> DocketError {
    log::error!("{}", message);
    DocketError::new(message, ErrorKind::ConfigError)
}
