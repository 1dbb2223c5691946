//! Driving port for project management.

use async_trait::async_trait;

use crate::domain::{
    Claims, Error, NewProject, NewSprint, Project, ProjectId, ProjectPatch, ProjectRole, SprintId,
    SprintProgress, UserId,
};

/// Project use-cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Create a project bound to an existing group.
    async fn create(&self, claims: &Claims, draft: NewProject) -> Result<Project, Error>;

    /// Fetch one project the caller may see.
    async fn get(&self, claims: &Claims, id: &ProjectId) -> Result<Project, Error>;

    /// Every project for admins; otherwise those the caller belongs to.
    async fn list(&self, claims: &Claims) -> Result<Vec<Project>, Error>;

    /// Patch a project.
    async fn update(
        &self,
        claims: &Claims,
        id: &ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, Error>;

    /// Delete a project. Notes referencing it are left untouched.
    async fn delete(&self, claims: &Claims, id: &ProjectId) -> Result<(), Error>;

    /// Add a member; the role defaults to [`ProjectRole::Developer`].
    async fn add_member(
        &self,
        claims: &Claims,
        id: &ProjectId,
        user: UserId,
        role: Option<ProjectRole>,
    ) -> Result<Project, Error>;

    /// Remove a member.
    async fn remove_member(
        &self,
        claims: &Claims,
        id: &ProjectId,
        user: &UserId,
    ) -> Result<Project, Error>;

    /// Append a sprint.
    async fn create_sprint(
        &self,
        claims: &Claims,
        id: &ProjectId,
        draft: NewSprint,
    ) -> Result<Project, Error>;

    /// Update one sprint's status and completion.
    async fn update_sprint(
        &self,
        claims: &Claims,
        id: &ProjectId,
        sprint: &SprintId,
        progress: SprintProgress,
    ) -> Result<Project, Error>;
}
