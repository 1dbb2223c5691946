//! Group directory service.
//!
//! Every mutation requires the global admin role. Lookups resolve the group
//! first so a missing id is reported as not found before any access
//! decision.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::access::{can_admin_group, can_view_group, ensure};
use crate::domain::membership::{Member, MembershipChange};
use crate::domain::ports::{GroupDirectory, GroupRepository, UserRepository};
use crate::domain::repository_errors::{map_group_error, map_user_error};
use crate::domain::{Claims, Error, Group, GroupId, GroupPatch, GroupRole, NewGroup, UserId};

const ADMIN_REQUIRED: &str = "administrator role required to manage groups";

/// Service implementing [`GroupDirectory`].
#[derive(Clone)]
pub struct GroupDirectoryService<G, U> {
    groups: Arc<G>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<G, U> GroupDirectoryService<G, U> {
    /// Create a group directory.
    pub fn new(groups: Arc<G>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            groups,
            users,
            clock,
        }
    }
}

impl<G, U> GroupDirectoryService<G, U>
where
    G: GroupRepository,
    U: UserRepository,
{
    async fn load(&self, id: &GroupId) -> Result<Group, Error> {
        self.groups
            .find_by_id(id)
            .await
            .map_err(map_group_error)?
            .ok_or_else(|| Error::not_found("group not found"))
    }

    /// Resolve the group, then require the admin role.
    async fn load_for_admin(&self, claims: &Claims, id: &GroupId) -> Result<Group, Error> {
        let group = self.load(id).await?;
        ensure(can_admin_group(claims), ADMIN_REQUIRED)?;
        Ok(group)
    }

    async fn ensure_user_exists(&self, user: &UserId) -> Result<(), Error> {
        match self.users.find_by_id(user).await.map_err(map_user_error)? {
            Some(_) => Ok(()),
            None => Err(Error::not_found("user not found")),
        }
    }

    async fn change(
        &self,
        id: &GroupId,
        change: MembershipChange<GroupRole>,
    ) -> Result<Group, Error> {
        self.groups
            .change_membership(id, change, self.clock.utc())
            .await
            .map_err(map_group_error)?
            .into_result("group")
    }
}

#[async_trait]
impl<G, U> GroupDirectory for GroupDirectoryService<G, U>
where
    G: GroupRepository,
    U: UserRepository,
{
    async fn create(&self, claims: &Claims, draft: NewGroup) -> Result<Group, Error> {
        ensure(can_admin_group(claims), ADMIN_REQUIRED)?;
        let group = Group::create(draft, claims.user_id, self.clock.utc());
        self.groups.insert(&group).await.map_err(map_group_error)?;
        info!(group_id = %group.id, actor = %claims.user_id, "created group");
        Ok(group)
    }

    async fn get(&self, claims: &Claims, id: &GroupId) -> Result<Group, Error> {
        let group = self.load(id).await?;
        ensure(
            can_view_group(claims, &group),
            "group is private to its members",
        )?;
        Ok(group)
    }

    async fn list(&self, claims: &Claims) -> Result<Vec<Group>, Error> {
        self.groups
            .list_visible_to(&claims.user_id)
            .await
            .map_err(map_group_error)
    }

    async fn update(
        &self,
        claims: &Claims,
        id: &GroupId,
        patch: GroupPatch,
    ) -> Result<Group, Error> {
        let mut group = self.load_for_admin(claims, id).await?;
        patch.apply(&mut group, self.clock.utc());
        if !self
            .groups
            .update_details(&group)
            .await
            .map_err(map_group_error)?
        {
            return Err(Error::not_found("group not found"));
        }
        Ok(group)
    }

    async fn delete(&self, claims: &Claims, id: &GroupId) -> Result<(), Error> {
        self.load_for_admin(claims, id).await?;
        if !self.groups.delete(id).await.map_err(map_group_error)? {
            return Err(Error::not_found("group not found"));
        }
        info!(group_id = %id, actor = %claims.user_id, "deleted group");
        Ok(())
    }

    async fn add_member(
        &self,
        claims: &Claims,
        id: &GroupId,
        user: UserId,
        role: Option<GroupRole>,
    ) -> Result<Group, Error> {
        self.load_for_admin(claims, id).await?;
        self.ensure_user_exists(&user).await?;
        let member = Member::new(user, role.unwrap_or(GroupRole::Member), self.clock.utc());
        self.change(id, MembershipChange::Add(member)).await
    }

    async fn remove_member(
        &self,
        claims: &Claims,
        id: &GroupId,
        user: &UserId,
    ) -> Result<Group, Error> {
        self.load_for_admin(claims, id).await?;
        self.change(id, MembershipChange::Remove(*user)).await
    }

    async fn update_member_role(
        &self,
        claims: &Claims,
        id: &GroupId,
        user: &UserId,
        role: GroupRole,
    ) -> Result<Group, Error> {
        self.load_for_admin(claims, id).await?;
        self.change(id, MembershipChange::SetRole(*user, role)).await
    }
}

#[cfg(test)]
#[path = "group_directory_service_tests.rs"]
mod tests;
