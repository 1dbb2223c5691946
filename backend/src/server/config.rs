//! HTTP server configuration object.

use std::net::SocketAddr;

/// Default ceiling for raw upload bodies (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) expose_error_details: bool,
    pub(crate) max_upload_bytes: usize,
}

impl ServerConfig {
    /// Listen on `bind_addr` with redacted internal errors and the default
    /// upload limit.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            expose_error_details: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Return internal error messages to clients instead of the generic text.
    #[must_use]
    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }

    /// Cap the size of raw upload bodies.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Listener socket.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Whether internal error messages reach clients.
    #[must_use]
    pub fn expose_error_details(&self) -> bool {
        self.expose_error_details
    }

    /// Payload limit for raw uploads.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("socket address");
        let config = ServerConfig::new(addr);
        assert!(!config.expose_error_details());
        assert_eq!(config.max_upload_bytes(), DEFAULT_MAX_UPLOAD_BYTES);

        let config = config.with_error_details(true).with_max_upload_bytes(10);
        assert!(config.expose_error_details());
        assert_eq!(config.max_upload_bytes(), 10);
        assert_eq!(config.bind_addr(), addr);
    }
}
