//! PostgreSQL-backed `ProjectRepository`.
//!
//! Members and sprints are JSONB columns on the project row. Writes aimed
//! at either list lock the row first so concurrent changes serialise.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::expression_methods::PgJsonbExpressionMethods;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::membership::{MembershipChange, MembershipWrite};
use crate::domain::ports::{EmbeddedWrite, ProjectRepository, ProjectRepositoryError};
use crate::domain::{Project, ProjectId, ProjectRole, Sprint, SprintId, SprintProgress, UserId};

use super::diesel_basic_error_mapping::{
    DieselErrorMapping, codec_to_diesel, describe_codec_error, map_basic_diesel_error,
    map_basic_pool_error,
};
use super::diesel_group_repository::member_pattern;
use super::models::{ProjectDetails, ProjectRow, RowCodecError, to_json};
use super::pool::{DbPool, PoolError};
use super::schema::projects;

/// Diesel-backed implementation of the `ProjectRepository` port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProjectRepositoryError {
    map_basic_pool_error(error, ProjectRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> ProjectRepositoryError {
    map_basic_diesel_error(
        error,
        DieselErrorMapping {
            query: ProjectRepositoryError::query,
            connection: ProjectRepositoryError::connection,
            duplicate: |_: Option<&str>| ProjectRepositoryError::duplicate("name"),
        },
    )
}

fn map_codec_error(error: RowCodecError) -> ProjectRepositoryError {
    ProjectRepositoryError::query(describe_codec_error(&error))
}

fn decode(row: ProjectRow) -> Result<Project, ProjectRepositoryError> {
    Project::try_from(row).map_err(map_codec_error)
}

/// Load and lock a project row for the rest of the transaction.
async fn lock_project(
    conn: &mut AsyncPgConnection,
    key: Uuid,
) -> Result<Option<Project>, DieselError> {
    let row: Option<ProjectRow> = projects::table
        .find(key)
        .select(ProjectRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    row.map(|row| Project::try_from(row).map_err(codec_to_diesel))
        .transpose()
}

async fn store_members(
    conn: &mut AsyncPgConnection,
    project: &Project,
    now: DateTime<Utc>,
) -> Result<ProjectRow, DieselError> {
    let members = to_json("members", &project.members).map_err(codec_to_diesel)?;
    diesel::update(projects::table.find(project.id.as_uuid()))
        .set((projects::members.eq(members), projects::updated_at.eq(now)))
        .returning(ProjectRow::as_returning())
        .get_result(conn)
        .await
}

async fn store_sprints(
    conn: &mut AsyncPgConnection,
    project: &Project,
    now: DateTime<Utc>,
) -> Result<ProjectRow, DieselError> {
    let sprints = to_json("sprints", &project.sprints).map_err(codec_to_diesel)?;
    diesel::update(projects::table.find(project.id.as_uuid()))
        .set((projects::sprints.eq(sprints), projects::updated_at.eq(now)))
        .returning(ProjectRow::as_returning())
        .get_result(conn)
        .await
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let row = ProjectRow::from_domain(project).map_err(map_codec_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(projects::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_details(&self, project: &Project) -> Result<bool, ProjectRepositoryError> {
        let details = ProjectDetails::from_domain(project).map_err(map_codec_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(projects::table.find(project.id.as_uuid()))
            .set(details)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        projects::table
            .find(id.as_uuid())
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProjectRow> = projects::table
            .select(ProjectRow::as_select())
            .order_by((projects::created_at.asc(), projects::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn list_for_member(
        &self,
        user: &UserId,
    ) -> Result<Vec<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::members.contains(member_pattern(user)))
            .select(ProjectRow::as_select())
            .order_by((projects::created_at.asc(), projects::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(projects::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn change_membership(
        &self,
        id: &ProjectId,
        change: MembershipChange<ProjectRole>,
        now: DateTime<Utc>,
    ) -> Result<MembershipWrite<Project>, ProjectRepositoryError> {
        let key = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let Some(mut project) = lock_project(conn, key).await? else {
                        return Ok(MembershipWrite::Missing);
                    };
                    if let Err(rejected) = change.apply(&mut project.members) {
                        return Ok(rejected.rejected());
                    }
                    let row = store_members(conn, &project, now).await?;
                    Ok::<_, DieselError>(MembershipWrite::Applied(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        outcome.try_map(decode)
    }

    async fn append_sprint(
        &self,
        id: &ProjectId,
        sprint: Sprint,
        now: DateTime<Utc>,
    ) -> Result<Option<Project>, ProjectRepositoryError> {
        let key = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = conn
            .transaction(|conn| {
                async move {
                    let Some(mut project) = lock_project(conn, key).await? else {
                        return Ok(None);
                    };
                    project.sprints.push(sprint);
                    let row = store_sprints(conn, &project, now).await?;
                    Ok::<_, DieselError>(Some(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        row.map(decode).transpose()
    }

    async fn update_sprint(
        &self,
        id: &ProjectId,
        sprint: &SprintId,
        progress: SprintProgress,
        now: DateTime<Utc>,
    ) -> Result<EmbeddedWrite<Project>, ProjectRepositoryError> {
        let key = *id.as_uuid();
        let target = *sprint;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let Some(mut project) = lock_project(conn, key).await? else {
                        return Ok(EmbeddedWrite::Missing);
                    };
                    let Some(slot) = project.sprints.iter_mut().find(|s| s.id == target) else {
                        return Ok(EmbeddedWrite::ItemMissing);
                    };
                    progress.apply(slot);
                    let row = store_sprints(conn, &project, now).await?;
                    Ok::<_, DieselError>(EmbeddedWrite::Applied(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        outcome.try_map(decode)
    }
}
