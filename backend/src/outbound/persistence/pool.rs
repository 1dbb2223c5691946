//! Shared `bb8` pool of `diesel-async` PostgreSQL connections.
//!
//! Every Diesel repository holds a clone of one [`DbPool`]. Checkout and
//! build failures surface as [`PoolError`] and repositories translate them
//! into their own `Connection` error variant.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Failure building the pool or borrowing a connection from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became free before the checkout timeout.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// The pool could not be created.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Checkout failure carrying the driver's message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Build failure carrying the driver's message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Connection limits applied when the pool is built.
///
/// Loaded from the `TASKBOARD_DB_*` settings; see
/// [`crate::server::AppSettings::pool_limits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_idle: u32,
    /// How long a repository waits for a free connection.
    pub checkout_timeout: Duration,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_idle: 2,
            checkout_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolLimits {
    fn check(&self) -> Result<(), PoolError> {
        if self.max_connections == 0 {
            return Err(PoolError::build("max connections must be positive"));
        }
        if self.min_idle > self.max_connections {
            return Err(PoolError::build(format!(
                "min idle ({}) exceeds max connections ({})",
                self.min_idle, self.max_connections
            )));
        }
        Ok(())
    }
}

/// Cloneable handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Connect to `database_url`, opening `min_idle` connections eagerly.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` when the limits are inconsistent, the URL
    /// is invalid or the initial connections cannot be opened.
    pub async fn connect(database_url: &str, limits: PoolLimits) -> Result<Self, PoolError> {
        limits.check()?;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(limits.max_connections)
            .min_idle(Some(limits.min_idle))
            .connection_timeout(limits.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` when none frees up within the timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
