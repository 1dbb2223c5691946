//! Credential service: password login and bearer-token validation.
//!
//! Tokens are stateless. Claims carry `{userId, username, role}` as of login,
//! so role changes take effect at the caller's next login.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{LoginService, PasswordHasher, TokenCodec, TokenValidator, UserRepository};
use crate::domain::repository_errors::{map_hash_error, map_token_error, map_user_error};
use crate::domain::{Claims, Error, IssuedToken, LoginCredentials, UserStatus};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Service implementing [`LoginService`] and [`TokenValidator`].
#[derive(Clone)]
pub struct CredentialService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    codec: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, H, T> CredentialService<U, H, T> {
    /// Create a credential service.
    pub fn new(users: Arc<U>, hasher: Arc<H>, codec: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            codec,
            clock,
        }
    }
}

#[async_trait]
impl<U, H, T> LoginService for CredentialService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenCodec,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<IssuedToken, Error> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?;

        let Some(user) = user else {
            debug!(username = credentials.username(), "login for unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .map_err(map_hash_error)?;
        if !verified {
            debug!(username = credentials.username(), "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        if user.status == UserStatus::Inactive {
            debug!(username = credentials.username(), "login for inactive account");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let claims = Claims::issue(user.id, user.username.as_str(), user.role, self.clock.utc());
        let token = self.codec.encode(&claims).map_err(map_token_error)?;
        Ok(IssuedToken { token, claims })
    }
}

impl<U, H, T> TokenValidator for CredentialService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenCodec,
{
    fn validate(&self, token: &str) -> Result<Claims, Error> {
        let claims = self.codec.decode(token).map_err(|err| {
            debug!(error = %err, "rejected bearer token");
            map_token_error(err)
        })?;
        if claims.expires_at <= self.clock.utc() {
            debug!(user_id = %claims.user_id, "rejected expired bearer token");
            return Err(Error::unauthorized("token expired"));
        }
        Ok(claims)
    }
}

#[cfg(test)]
#[path = "credential_service_tests.rs"]
mod tests;
