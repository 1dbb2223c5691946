//! In-memory [`ProjectRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::membership::{MembershipChange, MembershipWrite};
use crate::domain::ports::{EmbeddedWrite, ProjectRepository, ProjectRepositoryError};
use crate::domain::{Project, ProjectId, ProjectRole, Sprint, SprintId, SprintProgress, UserId};

/// Project store kept in process memory, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    projects: RwLock<Vec<Project>>,
}

impl InMemoryProjectRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(projects: &[Project], candidate: &Project) -> bool {
    projects
        .iter()
        .any(|p| p.id != candidate.id && p.name == candidate.name)
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut projects = self.projects.write().await;
        if name_taken(&projects, project) {
            return Err(ProjectRepositoryError::duplicate("name"));
        }
        projects.push(project.clone());
        Ok(())
    }

    async fn update_details(&self, project: &Project) -> Result<bool, ProjectRepositoryError> {
        let mut projects = self.projects.write().await;
        if name_taken(&projects, project) {
            return Err(ProjectRepositoryError::duplicate("name"));
        }
        let Some(slot) = projects.iter_mut().find(|p| p.id == project.id) else {
            return Ok(false);
        };
        // Members and sprints have their own write paths.
        let members = std::mem::take(&mut slot.members);
        let sprints = std::mem::take(&mut slot.sprints);
        *slot = project.clone();
        slot.members = members;
        slot.sprints = sprints;
        Ok(true)
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        Ok(self
            .projects
            .read()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Project>, ProjectRepositoryError> {
        Ok(self.projects.read().await.clone())
    }

    async fn list_for_member(
        &self,
        user: &UserId,
    ) -> Result<Vec<Project>, ProjectRepositoryError> {
        Ok(self
            .projects
            .read()
            .await
            .iter()
            .filter(|p| p.members.contains(user))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectRepositoryError> {
        let mut projects = self.projects.write().await;
        let before = projects.len();
        projects.retain(|p| &p.id != id);
        Ok(projects.len() != before)
    }

    async fn change_membership(
        &self,
        id: &ProjectId,
        change: MembershipChange<ProjectRole>,
        now: DateTime<Utc>,
    ) -> Result<MembershipWrite<Project>, ProjectRepositoryError> {
        let mut projects = self.projects.write().await;
        let Some(project) = projects.iter_mut().find(|p| &p.id == id) else {
            return Ok(MembershipWrite::Missing);
        };
        if let Err(rejected) = change.apply(&mut project.members) {
            return Ok(rejected.rejected());
        }
        project.updated_at = now;
        Ok(MembershipWrite::Applied(project.clone()))
    }

    async fn append_sprint(
        &self,
        id: &ProjectId,
        sprint: Sprint,
        now: DateTime<Utc>,
    ) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut projects = self.projects.write().await;
        Ok(projects.iter_mut().find(|p| &p.id == id).map(|project| {
            project.sprints.push(sprint);
            project.updated_at = now;
            project.clone()
        }))
    }

    async fn update_sprint(
        &self,
        id: &ProjectId,
        sprint: &SprintId,
        progress: SprintProgress,
        now: DateTime<Utc>,
    ) -> Result<EmbeddedWrite<Project>, ProjectRepositoryError> {
        let mut projects = self.projects.write().await;
        let Some(project) = projects.iter_mut().find(|p| &p.id == id) else {
            return Ok(EmbeddedWrite::Missing);
        };
        let Some(target) = project.sprint_mut(sprint) else {
            return Ok(EmbeddedWrite::ItemMissing);
        };
        progress.apply(target);
        project.updated_at = now;
        Ok(EmbeddedWrite::Applied(project.clone()))
    }
}
