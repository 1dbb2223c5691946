//! Project directory service.
//!
//! Projects bind to one group, which must exist when the project is created
//! or re-bound. Membership is independent of the group's roster.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::access::{
    Capability, can_admin_project, can_view_project, ensure, has_capability,
};
use crate::domain::membership::{Member, MembershipChange};
use crate::domain::ports::{
    EmbeddedWrite, GroupRepository, ProjectDirectory, ProjectRepository, UserRepository,
};
use crate::domain::repository_errors::{map_group_error, map_project_error, map_user_error};
use crate::domain::{
    Claims, Error, GroupId, NewProject, NewSprint, Project, ProjectId, ProjectPatch, ProjectRole,
    SprintId, SprintProgress, UserId,
};

const ADMIN_REQUIRED: &str = "administrator role required to manage projects";

/// Service implementing [`ProjectDirectory`].
#[derive(Clone)]
pub struct ProjectDirectoryService<P, G, U> {
    projects: Arc<P>,
    groups: Arc<G>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, G, U> ProjectDirectoryService<P, G, U> {
    /// Create a project directory.
    pub fn new(projects: Arc<P>, groups: Arc<G>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            projects,
            groups,
            users,
            clock,
        }
    }
}

impl<P, G, U> ProjectDirectoryService<P, G, U>
where
    P: ProjectRepository,
    G: GroupRepository,
    U: UserRepository,
{
    async fn load(&self, id: &ProjectId) -> Result<Project, Error> {
        self.projects
            .find_by_id(id)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found("project not found"))
    }

    async fn load_for_admin(&self, claims: &Claims, id: &ProjectId) -> Result<Project, Error> {
        let project = self.load(id).await?;
        ensure(can_admin_project(claims), ADMIN_REQUIRED)?;
        Ok(project)
    }

    async fn ensure_group_exists(&self, id: &GroupId) -> Result<(), Error> {
        match self.groups.find_by_id(id).await.map_err(map_group_error)? {
            Some(_) => Ok(()),
            None => Err(Error::not_found("group not found")),
        }
    }

    async fn ensure_user_exists(&self, id: &UserId) -> Result<(), Error> {
        match self.users.find_by_id(id).await.map_err(map_user_error)? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("user {id} not found"))),
        }
    }

    async fn change(
        &self,
        id: &ProjectId,
        change: MembershipChange<ProjectRole>,
    ) -> Result<Project, Error> {
        self.projects
            .change_membership(id, change, self.clock.utc())
            .await
            .map_err(map_project_error)?
            .into_result("project")
    }
}

#[async_trait]
impl<P, G, U> ProjectDirectory for ProjectDirectoryService<P, G, U>
where
    P: ProjectRepository,
    G: GroupRepository,
    U: UserRepository,
{
    async fn create(&self, claims: &Claims, draft: NewProject) -> Result<Project, Error> {
        ensure(can_admin_project(claims), ADMIN_REQUIRED)?;
        self.ensure_group_exists(&draft.group).await?;
        for (user_id, _) in &draft.members {
            self.ensure_user_exists(user_id).await?;
        }
        let project = Project::create(draft, claims.user_id, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.projects
            .insert(&project)
            .await
            .map_err(map_project_error)?;
        info!(project_id = %project.id, group_id = %project.group, "created project");
        Ok(project)
    }

    async fn get(&self, claims: &Claims, id: &ProjectId) -> Result<Project, Error> {
        let project = self.load(id).await?;
        ensure(
            can_view_project(claims, &project),
            "project is visible to its members only",
        )?;
        Ok(project)
    }

    async fn list(&self, claims: &Claims) -> Result<Vec<Project>, Error> {
        let listed = if has_capability(claims, Capability::ReadAll) {
            self.projects.list_all().await
        } else {
            self.projects.list_for_member(&claims.user_id).await
        };
        listed.map_err(map_project_error)
    }

    async fn update(
        &self,
        claims: &Claims,
        id: &ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, Error> {
        let mut project = self.load_for_admin(claims, id).await?;
        if let Some(group) = &patch.group {
            self.ensure_group_exists(group).await?;
        }
        patch.apply(&mut project, self.clock.utc());
        if !self
            .projects
            .update_details(&project)
            .await
            .map_err(map_project_error)?
        {
            return Err(Error::not_found("project not found"));
        }
        Ok(project)
    }

    async fn delete(&self, claims: &Claims, id: &ProjectId) -> Result<(), Error> {
        self.load_for_admin(claims, id).await?;
        if !self.projects.delete(id).await.map_err(map_project_error)? {
            return Err(Error::not_found("project not found"));
        }
        info!(project_id = %id, actor = %claims.user_id, "deleted project");
        Ok(())
    }

    async fn add_member(
        &self,
        claims: &Claims,
        id: &ProjectId,
        user: UserId,
        role: Option<ProjectRole>,
    ) -> Result<Project, Error> {
        self.load_for_admin(claims, id).await?;
        self.ensure_user_exists(&user).await?;
        let member = Member::new(
            user,
            role.unwrap_or(ProjectRole::Developer),
            self.clock.utc(),
        );
        self.change(id, MembershipChange::Add(member)).await
    }

    async fn remove_member(
        &self,
        claims: &Claims,
        id: &ProjectId,
        user: &UserId,
    ) -> Result<Project, Error> {
        self.load_for_admin(claims, id).await?;
        self.change(id, MembershipChange::Remove(*user)).await
    }

    async fn create_sprint(
        &self,
        claims: &Claims,
        id: &ProjectId,
        draft: NewSprint,
    ) -> Result<Project, Error> {
        self.load_for_admin(claims, id).await?;
        let sprint = draft
            .into_sprint()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.projects
            .append_sprint(id, sprint, self.clock.utc())
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found("project not found"))
    }

    async fn update_sprint(
        &self,
        claims: &Claims,
        id: &ProjectId,
        sprint: &SprintId,
        progress: SprintProgress,
    ) -> Result<Project, Error> {
        self.load_for_admin(claims, id).await?;
        match self
            .projects
            .update_sprint(id, sprint, progress, self.clock.utc())
            .await
            .map_err(map_project_error)?
        {
            EmbeddedWrite::Applied(project) => Ok(project),
            EmbeddedWrite::ItemMissing => Err(Error::not_found("sprint not found")),
            EmbeddedWrite::Missing => Err(Error::not_found("project not found")),
        }
    }
}

#[cfg(test)]
#[path = "project_directory_service_tests.rs"]
mod tests;
