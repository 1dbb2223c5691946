//! Driving port for group management.

use async_trait::async_trait;

use crate::domain::{Claims, Error, Group, GroupId, GroupPatch, GroupRole, NewGroup, UserId};

/// Group use-cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Create a group with the caller as its first admin member.
    async fn create(&self, claims: &Claims, draft: NewGroup) -> Result<Group, Error>;

    /// Fetch one group the caller may see.
    async fn get(&self, claims: &Claims, id: &GroupId) -> Result<Group, Error>;

    /// Public groups plus those the caller belongs to.
    async fn list(&self, claims: &Claims) -> Result<Vec<Group>, Error>;

    /// Patch a group's descriptive fields.
    async fn update(&self, claims: &Claims, id: &GroupId, patch: GroupPatch)
    -> Result<Group, Error>;

    /// Delete a group. Projects referencing it are left untouched.
    async fn delete(&self, claims: &Claims, id: &GroupId) -> Result<(), Error>;

    /// Add a member; the role defaults to [`GroupRole::Member`].
    async fn add_member(
        &self,
        claims: &Claims,
        id: &GroupId,
        user: UserId,
        role: Option<GroupRole>,
    ) -> Result<Group, Error>;

    /// Remove a member.
    async fn remove_member(
        &self,
        claims: &Claims,
        id: &GroupId,
        user: &UserId,
    ) -> Result<Group, Error>;

    /// Change a member's role.
    async fn update_member_role(
        &self,
        claims: &Claims,
        id: &GroupId,
        user: &UserId,
        role: GroupRole,
    ) -> Result<Group, Error>;
}
