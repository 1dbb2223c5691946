//! Driving ports for login and bearer-token validation.
//!
//! Inbound adapters call these to authenticate credentials and to turn an
//! `Authorization` header into verified [`Claims`] without knowing which
//! hasher, codec or repository backs them.

use async_trait::async_trait;

use crate::domain::{Claims, Error, IssuedToken, LoginCredentials};

/// Exchange credentials for a signed token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and issue a token.
    ///
    /// Unknown usernames and wrong passwords fail identically with
    /// `unauthorized`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<IssuedToken, Error>;
}

/// Verify a presented bearer token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenValidator: Send + Sync {
    /// Return the token's claims, or `unauthorized` when it is malformed,
    /// forged or expired.
    fn validate(&self, token: &str) -> Result<Claims, Error>;
}
