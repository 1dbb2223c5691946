//! Driving ports for self-service accounts and user administration.

use async_trait::async_trait;

use crate::domain::{
    AdminUserPatch, BlobUpload, Claims, Error, Registration, SelfProfileUpdate, User, UserId,
};

/// Operations a user performs on their own account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account with role `user` and status `active`.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// The caller's current record.
    async fn current_user(&self, claims: &Claims) -> Result<User, Error>;

    /// Update the caller's profile, email, password or image reference.
    async fn update_profile(
        &self,
        claims: &Claims,
        update: SelfProfileUpdate,
    ) -> Result<User, Error>;

    /// Store a new profile image and point the caller's record at it.
    async fn replace_profile_image(
        &self,
        claims: &Claims,
        upload: BlobUpload,
    ) -> Result<User, Error>;
}

/// Operations an administrator performs on other accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Every user.
    async fn list_users(&self, claims: &Claims) -> Result<Vec<User>, Error>;

    /// One user by id.
    async fn get_user(&self, claims: &Claims, id: &UserId) -> Result<User, Error>;

    /// Edit a user record.
    async fn update_user(
        &self,
        claims: &Claims,
        id: &UserId,
        patch: AdminUserPatch,
    ) -> Result<User, Error>;

    /// Delete a user record.
    async fn delete_user(&self, claims: &Claims, id: &UserId) -> Result<(), Error>;
}
