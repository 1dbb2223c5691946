//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler under `/api/v1`, the health probes,
//! the request and response payloads, and the bearer token security scheme.
//! The document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::groups::{
    AddGroupMemberRequest, CreateGroupRequest, GroupMemberResponse, GroupResponse,
    UpdateGroupMemberRequest, UpdateGroupRequest,
};
use crate::inbound::http::notes_dto::{
    AddAttachmentRequest, AttachmentResponse, CreateNoteRequest, NoteResponse, UpdateNoteRequest,
};
use crate::inbound::http::projects_dto::{
    AddProjectMemberRequest, CreateProjectRequest, CreateSprintRequest, KanbanColumnRequest,
    KanbanColumnResponse, MetricsPayload, ProjectMemberRequest, ProjectMemberResponse,
    ProjectResponse, SprintResponse, UpdateProjectRequest, UpdateSprintRequest,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users_dto::{
    AdminUserUpdateRequest, LoginRequest, LoginResponse, RegisterRequest, SelfUpdateRequest,
    UploadResponse, UserResponse,
};

/// Name of the bearer security scheme referenced by handler annotations.
pub const BEARER_AUTH: &str = "BearerAuth";

/// Adds the bearer JWT security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.bearer_format = Some("JWT".to_owned());
        scheme.description = Some("Token issued by POST /api/v1/auth/login.".to_owned());
        components.add_security_scheme(BEARER_AUTH, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Taskboard API",
        description = "Users, groups, projects with sprints and kanban boards, and notes.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::accounts::update_current_user,
        crate::inbound::http::accounts::replace_profile_image,
        crate::inbound::http::accounts::list_users,
        crate::inbound::http::accounts::upload,
        crate::inbound::http::accounts::get_image,
        crate::inbound::http::admin_users::list_users,
        crate::inbound::http::admin_users::get_user,
        crate::inbound::http::admin_users::update_user,
        crate::inbound::http::admin_users::delete_user,
        crate::inbound::http::groups::list_groups,
        crate::inbound::http::groups::create_group,
        crate::inbound::http::groups::get_group,
        crate::inbound::http::groups::update_group,
        crate::inbound::http::groups::delete_group,
        crate::inbound::http::groups::add_group_member,
        crate::inbound::http::groups::update_group_member_role,
        crate::inbound::http::groups::remove_group_member,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::projects::add_project_member,
        crate::inbound::http::projects::remove_project_member,
        crate::inbound::http::projects::create_sprint,
        crate::inbound::http::projects::update_sprint,
        crate::inbound::http::notes::list_notes,
        crate::inbound::http::notes::create_note,
        crate::inbound::http::notes::get_note,
        crate::inbound::http::notes::update_note,
        crate::inbound::http::notes::delete_note,
        crate::inbound::http::notes::add_attachment,
        crate::inbound::http::notes::upload_attachment,
        crate::inbound::http::notes::remove_attachment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        SelfUpdateRequest,
        AdminUserUpdateRequest,
        UserResponse,
        UploadResponse,
        CreateGroupRequest,
        UpdateGroupRequest,
        AddGroupMemberRequest,
        UpdateGroupMemberRequest,
        GroupMemberResponse,
        GroupResponse,
        KanbanColumnRequest,
        ProjectMemberRequest,
        CreateProjectRequest,
        MetricsPayload,
        UpdateProjectRequest,
        AddProjectMemberRequest,
        CreateSprintRequest,
        UpdateSprintRequest,
        ProjectMemberResponse,
        SprintResponse,
        KanbanColumnResponse,
        ProjectResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        AddAttachmentRequest,
        AttachmentResponse,
        NoteResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and the caller's own account"),
        (name = "admin", description = "User administration"),
        (name = "groups", description = "Groups and their members"),
        (name = "projects", description = "Projects, sprints and kanban boards"),
        (name = "notes", description = "Notes and attachments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
