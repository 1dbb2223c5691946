//! Port abstraction for group persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::membership::{MembershipChange, MembershipWrite};
use crate::domain::{Group, GroupId, GroupRole, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by group repository adapters.
    pub enum GroupRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "group repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "group repository query failed: {message}",
        /// The group name is already taken.
        Duplicate { field: String } => "a group with this {field} already exists",
    }
}

/// Storage for groups and their embedded membership lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a new group.
    async fn insert(&self, group: &Group) -> Result<(), GroupRepositoryError>;

    /// Overwrite the descriptive fields of a group, leaving members intact.
    /// Returns `false` when no record matched.
    async fn update_details(&self, group: &Group) -> Result<bool, GroupRepositoryError>;

    /// Fetch a group by identifier.
    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupRepositoryError>;

    /// Groups that are public or list `user` as a member, in creation order.
    async fn list_visible_to(&self, user: &UserId) -> Result<Vec<Group>, GroupRepositoryError>;

    /// Remove a group. Returns `false` when no record matched.
    async fn delete(&self, id: &GroupId) -> Result<bool, GroupRepositoryError>;

    /// Apply a membership change atomically against the stored list.
    ///
    /// The precondition (absent for add, present for remove or role change)
    /// is evaluated against committed state under the same lock as the
    /// write, so concurrent adds cannot duplicate a member.
    async fn change_membership(
        &self,
        id: &GroupId,
        change: MembershipChange<GroupRole>,
        now: DateTime<Utc>,
    ) -> Result<MembershipWrite<Group>, GroupRepositoryError>;
}
