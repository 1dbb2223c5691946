//! Process settings loaded via OrthoConfig.
//!
//! Values merge from CLI flags, `TASKBOARD_*` environment variables and
//! configuration files. The token signing secret is loaded separately by
//! [`crate::inbound::http::token_config`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use super::{DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};
use crate::outbound::persistence::PoolLimits;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BLOB_DIR: &str = "./data/blobs";

/// Invalid listener address.
#[derive(Debug, thiserror::Error)]
#[error("invalid bind address '{value}': {source}")]
pub struct BindAddrError {
    value: String,
    #[source]
    source: std::net::AddrParseError,
}

/// Settings controlling the HTTP listener and storage.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TASKBOARD")]
pub struct AppSettings {
    /// Listener address.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. In-memory repositories are used when absent.
    pub database_url: Option<String>,
    /// Directory holding uploaded blobs.
    pub blob_dir: Option<PathBuf>,
    /// Return internal error messages to clients.
    #[ortho_config(default = false)]
    pub expose_error_details: bool,
    /// Upper bound for raw upload bodies.
    pub max_upload_bytes: Option<usize>,
    /// Maximum open database connections.
    pub db_max_connections: Option<u32>,
    /// Database connections kept open while idle.
    pub db_min_idle: Option<u32>,
    /// Seconds to wait for a free database connection.
    pub db_checkout_timeout_secs: Option<u64>,
}

impl AppSettings {
    /// Parse the listener address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`BindAddrError`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, BindAddrError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| BindAddrError {
            value: value.to_owned(),
            source,
        })
    }

    /// Blob directory, defaulting to `./data/blobs`.
    pub fn blob_dir(&self) -> PathBuf {
        self.blob_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOB_DIR))
    }

    /// Upload limit in bytes, defaulting to [`DEFAULT_MAX_UPLOAD_BYTES`].
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Database pool limits, with unset values taken from
    /// [`PoolLimits::default`].
    pub fn pool_limits(&self) -> PoolLimits {
        let defaults = PoolLimits::default();
        PoolLimits {
            max_connections: self.db_max_connections.unwrap_or(defaults.max_connections),
            min_idle: self.db_min_idle.unwrap_or(defaults.min_idle),
            checkout_timeout: self
                .db_checkout_timeout_secs
                .map_or(defaults.checkout_timeout, Duration::from_secs),
        }
    }

    /// Translate into the listener configuration.
    ///
    /// # Errors
    /// Returns [`BindAddrError`] for a malformed bind address.
    pub fn server_config(&self) -> Result<ServerConfig, BindAddrError> {
        Ok(ServerConfig::new(self.bind_addr()?)
            .with_error_details(self.expose_error_details)
            .with_max_upload_bytes(self.max_upload_bytes()))
    }
}
