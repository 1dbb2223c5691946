//! Project directory HTTP handlers.
//!
//! ```text
//! GET /api/v1/projects
//! POST /api/v1/projects {"name":"P1","groupId":"..."}
//! GET /api/v1/projects/{id}
//! PUT /api/v1/projects/{id} {"status":"active"}
//! DELETE /api/v1/projects/{id}
//! POST /api/v1/projects/{id}/members {"userId":"...","roleInProject":"tester"}
//! DELETE /api/v1/projects/{id}/members/{userId}
//! POST /api/v1/projects/{id}/sprints {"name":"Sprint 1"}
//! PATCH /api/v1/projects/{id}/sprints/{sprintId} {"status":"in-progress"}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;

use crate::domain::{
    Error, NewProject, NewSprint, ProjectId, ProjectPatch, SprintId, SprintProgress, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::projects_dto::{
    AddProjectMemberRequest, CreateProjectRequest, CreateSprintRequest, ProjectResponse,
    UpdateProjectRequest, UpdateSprintRequest,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

#[derive(Debug, Deserialize)]
struct ProjectPath {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MemberPath {
    id: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SprintPath {
    id: String,
    sprint_id: String,
}

fn project_id(raw: &str) -> Result<ProjectId, Error> {
    parse_id(raw, FieldName::new("id"))
}

/// List projects visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Projects", body = [ProjectResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "listProjects",
    security(("BearerAuth" = []))
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<ProjectResponse>>> {
    let projects = state.projects.list(caller.claims()).await?;
    Ok(web::Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

/// Create a project bound to an existing group.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Created", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Group or member not found", body = ErrorSchema),
        (status = 409, description = "Name taken", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "createProject",
    security(("BearerAuth" = []))
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateProjectRequest>,
) -> ApiResult<HttpResponse> {
    let draft = NewProject::try_from(payload.into_inner())?;
    let project = state.projects.create(caller.claims(), draft).await?;
    Ok(HttpResponse::Created().json(ProjectResponse::from(project)))
}

/// Fetch one project.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a member", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "getProject",
    security(("BearerAuth" = []))
)]
#[get("/projects/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<ProjectPath>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let id = project_id(&path.id)?;
    let project = state.projects.get(caller.claims(), &id).await?;
    Ok(web::Json(project.into()))
}

/// Patch a project's scalar fields, tags, board or group.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Project or group not found", body = ErrorSchema),
        (status = 409, description = "Name taken", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "updateProject",
    security(("BearerAuth" = []))
)]
#[put("/projects/{id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<ProjectPath>,
    payload: web::Json<UpdateProjectRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let id = project_id(&path.id)?;
    let patch = ProjectPatch::try_from(payload.into_inner())?;
    let project = state.projects.update(caller.claims(), &id, patch).await?;
    Ok(web::Json(project.into()))
}

/// Delete a project. Its notes are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "deleteProject",
    security(("BearerAuth" = []))
)]
#[delete("/projects/{id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<ProjectPath>,
) -> ApiResult<HttpResponse> {
    let id = project_id(&path.id)?;
    state.projects.delete(caller.claims(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a member; the role defaults to `developer`.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/members",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = AddProjectMemberRequest,
    responses(
        (status = 200, description = "Member added", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Project or user not found", body = ErrorSchema),
        (status = 409, description = "Already a member", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "addProjectMember",
    security(("BearerAuth" = []))
)]
#[post("/projects/{id}/members")]
pub async fn add_project_member(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<ProjectPath>,
    payload: web::Json<AddProjectMemberRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let id = project_id(&path.id)?;
    let (user, role) = payload.into_inner().parse()?;
    let project = state
        .projects
        .add_member(caller.claims(), &id, user, role)
        .await?;
    Ok(web::Json(project.into()))
}

/// Remove a member.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/members/{user_id}",
    params(
        ("id" = String, Path, description = "Project identifier"),
        ("user_id" = String, Path, description = "Member's user identifier")
    ),
    responses(
        (status = 200, description = "Member removed", body = ProjectResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Project or member not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "removeProjectMember",
    security(("BearerAuth" = []))
)]
#[delete("/projects/{id}/members/{user_id}")]
pub async fn remove_project_member(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<MemberPath>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let id = project_id(&path.id)?;
    let user: UserId = parse_id(&path.user_id, FieldName::new("userId"))?;
    let project = state
        .projects
        .remove_member(caller.claims(), &id, &user)
        .await?;
    Ok(web::Json(project.into()))
}

/// Append a sprint.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/sprints",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = CreateSprintRequest,
    responses(
        (status = 200, description = "Sprint added", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "createSprint",
    security(("BearerAuth" = []))
)]
#[post("/projects/{id}/sprints")]
pub async fn create_sprint(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<ProjectPath>,
    payload: web::Json<CreateSprintRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let id = project_id(&path.id)?;
    let draft = NewSprint::try_from(payload.into_inner())?;
    let project = state
        .projects
        .create_sprint(caller.claims(), &id, draft)
        .await?;
    Ok(web::Json(project.into()))
}

/// Update a sprint's status or completion.
#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}/sprints/{sprint_id}",
    params(
        ("id" = String, Path, description = "Project identifier"),
        ("sprint_id" = String, Path, description = "Sprint identifier")
    ),
    request_body = UpdateSprintRequest,
    responses(
        (status = 200, description = "Sprint updated", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Project or sprint not found", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "updateSprint",
    security(("BearerAuth" = []))
)]
#[patch("/projects/{id}/sprints/{sprint_id}")]
pub async fn update_sprint(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<SprintPath>,
    payload: web::Json<UpdateSprintRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let id = project_id(&path.id)?;
    let sprint: SprintId = parse_id(&path.sprint_id, FieldName::new("sprintId"))?;
    let progress = SprintProgress::try_from(payload.into_inner())?;
    let project = state
        .projects
        .update_sprint(caller.claims(), &id, &sprint, progress)
        .await?;
    Ok(web::Json(project.into()))
}
