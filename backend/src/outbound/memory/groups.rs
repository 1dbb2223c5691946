//! In-memory [`GroupRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::membership::{MembershipChange, MembershipWrite};
use crate::domain::ports::{GroupRepository, GroupRepositoryError};
use crate::domain::{Group, GroupId, GroupRole, UserId};

/// Group store kept in process memory, in insertion order.
///
/// Membership changes hold the write lock across the precondition check and
/// the write, so concurrent adds cannot duplicate a member.
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: RwLock<Vec<Group>>,
}

impl InMemoryGroupRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(groups: &[Group], candidate: &Group) -> bool {
    groups
        .iter()
        .any(|g| g.id != candidate.id && g.name == candidate.name)
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn insert(&self, group: &Group) -> Result<(), GroupRepositoryError> {
        let mut groups = self.groups.write().await;
        if name_taken(&groups, group) {
            return Err(GroupRepositoryError::duplicate("name"));
        }
        groups.push(group.clone());
        Ok(())
    }

    async fn update_details(&self, group: &Group) -> Result<bool, GroupRepositoryError> {
        let mut groups = self.groups.write().await;
        if name_taken(&groups, group) {
            return Err(GroupRepositoryError::duplicate("name"));
        }
        let Some(slot) = groups.iter_mut().find(|g| g.id == group.id) else {
            return Ok(false);
        };
        // Members are owned by `change_membership`; keep the stored roster.
        let members = std::mem::take(&mut slot.members);
        *slot = group.clone();
        slot.members = members;
        Ok(true)
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupRepositoryError> {
        Ok(self.groups.read().await.iter().find(|g| &g.id == id).cloned())
    }

    async fn list_visible_to(&self, user: &UserId) -> Result<Vec<Group>, GroupRepositoryError> {
        Ok(self
            .groups
            .read()
            .await
            .iter()
            .filter(|g| g.is_public() || g.members.contains(user))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &GroupId) -> Result<bool, GroupRepositoryError> {
        let mut groups = self.groups.write().await;
        let before = groups.len();
        groups.retain(|g| &g.id != id);
        Ok(groups.len() != before)
    }

    async fn change_membership(
        &self,
        id: &GroupId,
        change: MembershipChange<GroupRole>,
        now: DateTime<Utc>,
    ) -> Result<MembershipWrite<Group>, GroupRepositoryError> {
        let mut groups = self.groups.write().await;
        let Some(group) = groups.iter_mut().find(|g| &g.id == id) else {
            return Ok(MembershipWrite::Missing);
        };
        if let Err(rejected) = change.apply(&mut group.members) {
            return Ok(rejected.rejected());
        }
        group.updated_at = now;
        Ok(MembershipWrite::Applied(group.clone()))
    }
}
