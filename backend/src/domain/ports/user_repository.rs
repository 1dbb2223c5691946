//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique field (`username` or `email`) is already taken.
        Duplicate { field: String } => "a user with this {field} already exists",
    }
}

/// Storage for user accounts. Usernames and emails are unique.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `Duplicate` on a taken username or email.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Overwrite an existing user. Returns `false` when no record matched.
    async fn update(&self, user: &User) -> Result<bool, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserRepositoryError>;

    /// Every user, oldest first.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Remove a user. Returns `false` when no record matched.
    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError>;
}
