use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DATABASE, DEFAULT_MAX_POOL_SIZE, DEFAULT_MIN_POOL_SIZE,
    DEFAULT_SOCKET_TIMEOUT_MS, DEFAULT_STORE_ADDRESS,
};
use std::time::Duration;

/// Connection settings for a [`crate::store::DocumentStore`].
///
/// ```rust,ignore
/// let config = StoreConfig::new()
///     .address("memory://catalog")
///     .database("shop")
///     .pool_size(2, 8)
///     .socket_timeout(Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    address: String,
    database: String,
    min_pool_size: usize,
    max_pool_size: usize,
    connect_timeout: Duration,
    socket_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            address: DEFAULT_STORE_ADDRESS.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            min_pool_size: DEFAULT_MIN_POOL_SIZE,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            socket_timeout: Duration::from_millis(DEFAULT_SOCKET_TIMEOUT_MS),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        StoreConfig::default()
    }

    pub fn address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    pub fn pool_size(mut self, min: usize, max: usize) -> Self {
        self.min_pool_size = min;
        self.max_pool_size = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Upper bound on waiting for a pooled connection during an operation.
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = timeout;
        self
    }

    pub fn get_address(&self) -> &str {
        &self.address
    }

    pub fn get_database(&self) -> &str {
        &self.database
    }

    pub fn min_pool_size(&self) -> usize {
        self.min_pool_size
    }

    pub fn max_pool_size(&self) -> usize {
        self.max_pool_size
    }

    pub fn get_connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn get_socket_timeout(&self) -> Duration {
        self.socket_timeout
    }

    /// Checks the settings for consistency.
    pub fn validate(&self) -> DocketResult<()> {
        if self.address.trim().is_empty() {
            return Err(config_error("Store address must not be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(config_error("Database name must not be empty"));
        }
        if self.max_pool_size == 0 {
            return Err(config_error("Maximum pool size must be at least 1"));
        }
        if self.min_pool_size > self.max_pool_size {
            return Err(config_error(&format!(
                "Minimum pool size {} exceeds maximum pool size {}",
                self.min_pool_size, self.max_pool_size
            )));
        }
        if self.socket_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(config_error("Timeouts must be greater than zero"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> DocketError {
    log::error!("{}", message);
    DocketError::new(message, ErrorKind::ConfigError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StoreConfig::new();
        assert_eq!(config.get_address(), "memory://default");
        assert_eq!(config.get_database(), "docket");
        assert_eq!(config.min_pool_size(), 1);
        assert_eq!(config.max_pool_size(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn setters() {
        let config = StoreConfig::new()
            .address("memory://x")
            .database("shop")
            .pool_size(2, 4)
            .connect_timeout(Duration::from_millis(100))
            .socket_timeout(Duration::from_millis(200));
        assert_eq!(config.get_address(), "memory://x");
        assert_eq!(config.get_database(), "shop");
        assert_eq!(config.min_pool_size(), 2);
        assert_eq!(config.get_connect_timeout(), Duration::from_millis(100));
        assert_eq!(config.get_socket_timeout(), Duration::from_millis(200));
    }

    #[test]
    fn invalid_settings() {
        assert!(StoreConfig::new().database(" ").validate().is_err());
        assert!(StoreConfig::new().address("").validate().is_err());
        assert!(StoreConfig::new().pool_size(5, 2).validate().is_err());
        assert!(StoreConfig::new().pool_size(0, 0).validate().is_err());
        let err = StoreConfig::new().socket_timeout(Duration::ZERO).validate().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigError);
    }
}
