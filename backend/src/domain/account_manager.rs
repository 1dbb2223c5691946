//! Account services: registration, self-service profile edits and user
//! administration.
//!
//! The self-service path never touches `role` or `status`. The admin path
//! may, subject to [`can_edit_user_record`] and the rule that an admin cannot
//! demote or deactivate itself.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::access::{
    Capability, can_delete_user_record, can_edit_user_record, ensure, has_capability,
};
use crate::domain::ports::{
    AccountService, BlobStore, PasswordHasher, UserAdministration, UserRepository,
};
use crate::domain::repository_errors::{map_blob_error, map_hash_error, map_user_error};
use crate::domain::{
    AdminUserPatch, BlobId, BlobUpload, Claims, Error, Registration, Role, SelfProfileUpdate,
    User, UserId, UserProfile, UserStatus,
};

/// Service implementing [`AccountService`] and [`UserAdministration`].
#[derive(Clone)]
pub struct AccountManager<U, H, B> {
    users: Arc<U>,
    hasher: Arc<H>,
    blobs: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<U, H, B> AccountManager<U, H, B> {
    /// Create an account manager.
    pub fn new(users: Arc<U>, hasher: Arc<H>, blobs: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            blobs,
            clock,
        }
    }
}

impl<U, H, B> AccountManager<U, H, B>
where
    U: UserRepository,
    H: PasswordHasher,
    B: BlobStore,
{
    async fn load(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn store(&self, user: &User) -> Result<(), Error> {
        let updated = self.users.update(user).await.map_err(map_user_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::not_found("user not found"))
        }
    }

    async fn ensure_blob_exists(&self, id: &BlobId) -> Result<(), Error> {
        self.blobs
            .metadata(id)
            .await
            .map_err(map_blob_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found("image not found"))
    }

    /// Delete a blob whose reference was dropped. Failures only leave an
    /// orphan, so they are logged rather than returned.
    async fn discard_blob(&self, id: &BlobId) {
        if let Err(err) = self.blobs.delete(id).await {
            warn!(blob_id = %id, error = %err, "failed to delete unreferenced blob");
        }
    }

    fn require_user_manager(claims: &Claims) -> Result<(), Error> {
        ensure(
            has_capability(claims, Capability::ManageUsers),
            "administrator role required",
        )
    }
}

#[async_trait]
impl<U, H, B> AccountService for AccountManager<U, H, B>
where
    U: UserRepository,
    H: PasswordHasher,
    B: BlobStore,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            username,
            email,
            password,
            profile: patch,
        } = registration;
        let password_hash = self.hasher.hash(&password).map_err(map_hash_error)?;
        let now = self.clock.utc();
        let mut profile = UserProfile::default();
        patch.apply(&mut profile);
        let user = User {
            id: UserId::random(),
            username,
            email,
            password_hash,
            role: Role::User,
            status: UserStatus::Active,
            profile,
            image_id: None,
            joined_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, username = %user.username, "registered user");
        Ok(user)
    }

    async fn current_user(&self, claims: &Claims) -> Result<User, Error> {
        self.load(&claims.user_id).await
    }

    async fn update_profile(
        &self,
        claims: &Claims,
        update: SelfProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = self.load(&claims.user_id).await?;
        let SelfProfileUpdate {
            profile,
            email,
            password,
            image_id,
        } = update;
        if let Some(image_id) = image_id {
            self.ensure_blob_exists(&image_id).await?;
            user.image_id = Some(image_id);
        }
        if let Some(password) = password {
            user.password_hash = self.hasher.hash(&password).map_err(map_hash_error)?;
        }
        if let Some(email) = email {
            user.email = email;
        }
        profile.apply(&mut user.profile);
        user.updated_at = self.clock.utc();
        self.store(&user).await?;
        Ok(user)
    }

    async fn replace_profile_image(
        &self,
        claims: &Claims,
        upload: BlobUpload,
    ) -> Result<User, Error> {
        let mut user = self.load(&claims.user_id).await?;
        let stored = self.blobs.put(upload).await.map_err(map_blob_error)?;

        let previous = user.image_id.replace(stored.id);
        user.updated_at = self.clock.utc();
        if let Err(err) = self.store(&user).await {
            warn!(blob_id = %stored.id, "profile update failed; removing new image");
            self.discard_blob(&stored.id).await;
            return Err(err);
        }
        if let Some(previous) = previous {
            self.discard_blob(&previous).await;
        }
        Ok(user)
    }
}

#[async_trait]
impl<U, H, B> UserAdministration for AccountManager<U, H, B>
where
    U: UserRepository,
    H: PasswordHasher,
    B: BlobStore,
{
    async fn list_users(&self, claims: &Claims) -> Result<Vec<User>, Error> {
        Self::require_user_manager(claims)?;
        self.users.list().await.map_err(map_user_error)
    }

    async fn get_user(&self, claims: &Claims, id: &UserId) -> Result<User, Error> {
        Self::require_user_manager(claims)?;
        self.load(id).await
    }

    async fn update_user(
        &self,
        claims: &Claims,
        id: &UserId,
        patch: AdminUserPatch,
    ) -> Result<User, Error> {
        Self::require_user_manager(claims)?;
        let mut user = self.load(id).await?;
        ensure(
            can_edit_user_record(claims, &user),
            "administrators cannot edit other administrators",
        )?;
        let AdminUserPatch {
            profile,
            email,
            role,
            status,
        } = patch;
        if user.id == claims.user_id {
            ensure(
                role.is_none_or(|r| r == Role::Admin),
                "administrators cannot change their own role",
            )?;
            ensure(
                status.is_none_or(|s| s == UserStatus::Active),
                "administrators cannot deactivate themselves",
            )?;
        }
        if let Some(role) = role {
            user.role = role;
        }
        if let Some(status) = status {
            user.status = status;
        }
        if let Some(email) = email {
            user.email = email;
        }
        profile.apply(&mut user.profile);
        user.updated_at = self.clock.utc();
        self.store(&user).await?;
        info!(user_id = %user.id, actor = %claims.user_id, "administrator updated user");
        Ok(user)
    }

    async fn delete_user(&self, claims: &Claims, id: &UserId) -> Result<(), Error> {
        Self::require_user_manager(claims)?;
        let user = self.load(id).await?;
        ensure(
            can_delete_user_record(claims, &user),
            "this user cannot be deleted",
        )?;
        if !self.users.delete(id).await.map_err(map_user_error)? {
            return Err(Error::not_found("user not found"));
        }
        info!(user_id = %id, actor = %claims.user_id, "administrator deleted user");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_manager_tests.rs"]
mod tests;
