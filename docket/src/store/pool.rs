use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::StoreBackend;
use parking_lot::{Condvar, Mutex};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A live session with the store backend.
pub struct Connection {
    id: u64,
    backend: Arc<dyn StoreBackend>,
    opened_at: Instant,
}

impl Connection {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn backend(&self) -> &dyn StoreBackend {
        self.backend.as_ref()
    }

    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

/// Pool limits and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    pub min_size: usize,
    pub max_size: usize,
    /// How long pre-warming may take before the pool fails to open.
    pub connect_timeout: Duration,
    /// How long a checkout may wait for a free connection.
    pub checkout_timeout: Duration,
}

struct PoolState {
    idle: Vec<Connection>,
    total: usize,
    closed: bool,
}

struct PoolInner {
    backend: Arc<dyn StoreBackend>,
    options: PoolOptions,
    state: Mutex<PoolState>,
    available: Condvar,
    next_id: AtomicU64,
}

/// A bounded pool of backend connections.
///
/// The pool opens `min_size` connections up front and grows on demand up to
/// `max_size`. A checkout that finds every connection in use waits up to the
/// checkout timeout, then fails with `StorageUnavailable`.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Opens the pool and pre-warms `min_size` connections.
    ///
    /// # Errors
    ///
    /// `ConnectionError` if the backend cannot hand out `min_size`
    /// connections within the connect timeout.
    pub fn open(backend: Arc<dyn StoreBackend>, options: PoolOptions) -> DocketResult<ConnectionPool> {
        let inner = Arc::new(PoolInner {
            backend,
            options,
            state: Mutex::new(PoolState {
                idle: Vec::with_capacity(options.max_size),
                total: 0,
                closed: false,
            }),
            available: Condvar::new(),
            next_id: AtomicU64::new(1),
        });

        let deadline = Instant::now() + options.connect_timeout;
        let mut warm = Vec::with_capacity(options.min_size);
        while warm.len() < options.min_size {
            match inner.connect() {
                Ok(connection) => warm.push(connection),
                Err(err) => {
                    if Instant::now() >= deadline {
                        log::error!(
                            "Could not open {} connection(s) to {} within {:?}",
                            options.min_size,
                            inner.backend.name(),
                            options.connect_timeout
                        );
                        return Err(DocketError::new_with_cause(
                            &format!("Could not connect to {}", inner.backend.name()),
                            ErrorKind::ConnectionError,
                            err,
                        ));
                    }
                    std::thread::sleep(Duration::from_millis(10).min(options.connect_timeout));
                }
            }
        }

        {
            let mut state = inner.state.lock();
            state.total = warm.len();
            state.idle = warm;
        }
        log::debug!(
            "Connection pool for {} opened with {} connection(s)",
            inner.backend.name(),
            options.min_size
        );
        Ok(ConnectionPool { inner })
    }

    /// Takes a connection, waiting up to the checkout timeout.
    pub fn checkout(&self) -> DocketResult<PooledConnection> {
        let deadline = Instant::now() + self.inner.options.checkout_timeout;
        let mut state = self.inner.state.lock();
        loop {
            if state.closed {
                log::error!("Checkout from a closed connection pool");
                return Err(DocketError::new(
                    "Connection pool is closed",
                    ErrorKind::StorageUnavailable,
                ));
            }

            if let Some(connection) = state.idle.pop() {
                return Ok(self.guard(connection));
            }

            if state.total < self.inner.options.max_size {
                state.total += 1;
                drop(state);
                return match self.inner.connect() {
                    Ok(connection) => Ok(self.guard(connection)),
                    Err(err) => {
                        let mut state = self.inner.state.lock();
                        state.total -= 1;
                        self.inner.available.notify_one();
                        Err(DocketError::new_with_cause(
                            "Could not open a new pooled connection",
                            ErrorKind::StorageUnavailable,
                            err,
                        ))
                    }
                };
            }

            if self.inner.available.wait_until(&mut state, deadline).timed_out() {
                log::error!(
                    "Timed out after {:?} waiting for a pooled connection",
                    self.inner.options.checkout_timeout
                );
                return Err(DocketError::new(
                    "Timed out waiting for a pooled connection",
                    ErrorKind::StorageUnavailable,
                ));
            }
        }
    }

    /// Drops idle connections and fails every later checkout. Idempotent.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let idle = state.idle.len();
        state.idle.clear();
        state.total -= idle;
        self.inner.available.notify_all();
        log::debug!("Connection pool for {} closed", self.inner.backend.name());
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Connections currently open, idle or checked out.
    pub fn size(&self) -> usize {
        self.inner.state.lock().total
    }

    pub fn idle_count(&self) -> usize {
        self.inner.state.lock().idle.len()
    }

    pub fn options(&self) -> PoolOptions {
        self.inner.options
    }

    fn guard(&self, connection: Connection) -> PooledConnection {
        PooledConnection {
            connection: Some(connection),
            pool: self.inner.clone(),
        }
    }
}

impl PoolInner {
    fn connect(&self) -> DocketResult<Connection> {
        self.backend.open_connection()?;
        Ok(Connection {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            backend: self.backend.clone(),
            opened_at: Instant::now(),
        })
    }

    fn release(&self, connection: Connection) {
        let mut state = self.state.lock();
        if state.closed {
            state.total -= 1;
        } else {
            state.idle.push(connection);
        }
        self.available.notify_one();
    }
}

/// A checked-out connection. It returns to the pool when dropped.
pub struct PooledConnection {
    connection: Option<Connection>,
    pool: Arc<PoolInner>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // present until drop
        self.connection.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
        }
    }
}
