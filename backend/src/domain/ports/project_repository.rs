//! Port abstraction for project persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::membership::{MembershipChange, MembershipWrite};
use crate::domain::{Project, ProjectId, ProjectRole, Sprint, SprintId, SprintProgress, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by project repository adapters.
    pub enum ProjectRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
        /// The project name is already taken.
        Duplicate { field: String } => "a project with this {field} already exists",
    }
}

/// Outcome of a write addressed to one embedded item (sprint, attachment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedWrite<T> {
    /// The write was applied; carries the updated aggregate.
    Applied(T),
    /// The aggregate exists but the embedded item does not.
    ItemMissing,
    /// The aggregate does not exist.
    Missing,
}

impl<T> EmbeddedWrite<T> {
    /// Convert the carried aggregate, keeping the missing cases as is.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<EmbeddedWrite<U>, E> {
        Ok(match self {
            Self::Applied(value) => EmbeddedWrite::Applied(f(value)?),
            Self::ItemMissing => EmbeddedWrite::ItemMissing,
            Self::Missing => EmbeddedWrite::Missing,
        })
    }
}

/// Storage for projects with their embedded members and sprints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a new project.
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError>;

    /// Overwrite everything except members and sprints.
    /// Returns `false` when no record matched.
    async fn update_details(&self, project: &Project) -> Result<bool, ProjectRepositoryError>;

    /// Fetch a project by identifier.
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError>;

    /// Every project in creation order.
    async fn list_all(&self) -> Result<Vec<Project>, ProjectRepositoryError>;

    /// Projects listing `user` as a member, in creation order.
    async fn list_for_member(&self, user: &UserId)
    -> Result<Vec<Project>, ProjectRepositoryError>;

    /// Remove a project. Returns `false` when no record matched.
    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectRepositoryError>;

    /// Apply a membership change atomically; see
    /// [`super::GroupRepository::change_membership`].
    async fn change_membership(
        &self,
        id: &ProjectId,
        change: MembershipChange<ProjectRole>,
        now: DateTime<Utc>,
    ) -> Result<MembershipWrite<Project>, ProjectRepositoryError>;

    /// Append a sprint. Returns `None` when the project does not exist.
    async fn append_sprint(
        &self,
        id: &ProjectId,
        sprint: Sprint,
        now: DateTime<Utc>,
    ) -> Result<Option<Project>, ProjectRepositoryError>;

    /// Update one sprint's progress in place.
    async fn update_sprint(
        &self,
        id: &ProjectId,
        sprint: &SprintId,
        progress: SprintProgress,
        now: DateTime<Utc>,
    ) -> Result<EmbeddedWrite<Project>, ProjectRepositoryError>;
}
