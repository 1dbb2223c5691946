//! Group directory HTTP handlers.
//!
//! ```text
//! GET /api/v1/groups
//! POST /api/v1/groups {"name":"Eng","visibility":"private"}
//! GET /api/v1/groups/{id}
//! PUT /api/v1/groups/{id} {"description":"Platform team"}
//! DELETE /api/v1/groups/{id}
//! POST /api/v1/groups/{id}/members {"userId":"...","roleInGroup":"member"}
//! PUT /api/v1/groups/{id}/members/{userId} {"roleInGroup":"admin"}
//! DELETE /api/v1/groups/{id}/members/{userId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    EntityName, Error, Group, GroupId, GroupPatch, GroupRole, Member, NewGroup, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field, parse_enum, parse_id, parse_optional_enum, require,
};

const NAME: FieldName = FieldName::new("name");
const ROLE_IN_GROUP: FieldName = FieldName::new("roleInGroup");

#[derive(Debug, Deserialize)]
struct GroupPath {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MemberPath {
    id: String,
    user_id: String,
}

fn group_id(raw: &str) -> Result<GroupId, Error> {
    parse_id(raw, FieldName::new("id"))
}

fn parse_name(raw: String) -> Result<EntityName, Error> {
    EntityName::new(raw).map_err(|err| invalid_field(NAME, err))
}

/// Request payload for creating a group.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGroupRequest {
    #[schema(example = "Eng")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "private")]
    pub visibility: Option<String>,
    pub icon: Option<String>,
}

impl TryFrom<CreateGroupRequest> for NewGroup {
    type Error = Error;

    fn try_from(value: CreateGroupRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: parse_name(require(value.name, NAME)?)?,
            description: value.description,
            visibility: parse_optional_enum(
                value.visibility.as_deref(),
                FieldName::new("visibility"),
            )?,
            icon: value.icon,
        })
    }
}

/// Request payload for patching a group.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

impl TryFrom<UpdateGroupRequest> for GroupPatch {
    type Error = Error;

    fn try_from(value: UpdateGroupRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name.map(parse_name).transpose()?,
            description: value.description,
            visibility: parse_optional_enum(
                value.visibility.as_deref(),
                FieldName::new("visibility"),
            )?,
            icon: value.icon,
            is_active: value.is_active,
        })
    }
}

/// Request payload for adding a member.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddGroupMemberRequest {
    pub user_id: Option<String>,
    #[schema(example = "member")]
    pub role_in_group: Option<String>,
}

/// Request payload for changing a member's role.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateGroupMemberRequest {
    #[schema(example = "admin")]
    pub role_in_group: Option<String>,
}

/// One entry of a group's member list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberResponse {
    pub user_id: String,
    pub role_in_group: String,
    pub joined_at: String,
}

impl From<&Member<GroupRole>> for GroupMemberResponse {
    fn from(member: &Member<GroupRole>) -> Self {
        Self {
            user_id: member.user_id.to_string(),
            role_in_group: member.role.as_str().to_owned(),
            joined_at: member.joined_at.to_rfc3339(),
        }
    }
}

/// Response payload for a group.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub visibility: String,
    pub icon: Option<String>,
    pub is_active: bool,
    pub members: Vec<GroupMemberResponse>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        Self {
            id: group.id.to_string(),
            members: group.members.iter().map(GroupMemberResponse::from).collect(),
            name: group.name.to_string(),
            description: group.description,
            visibility: group.visibility.as_str().to_owned(),
            icon: group.icon,
            is_active: group.is_active,
            created_by: group.created_by.to_string(),
            created_at: group.created_at.to_rfc3339(),
            updated_at: group.updated_at.to_rfc3339(),
        }
    }
}

/// List groups that are public or include the caller.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    responses(
        (status = 200, description = "Visible groups", body = [GroupResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "listGroups",
    security(("BearerAuth" = []))
)]
#[get("/groups")]
pub async fn list_groups(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<GroupResponse>>> {
    let groups = state.groups.list(caller.claims()).await?;
    Ok(web::Json(groups.into_iter().map(GroupResponse::from).collect()))
}

/// Create a group with the caller as its first admin member.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Created", body = GroupResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Name taken", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "createGroup",
    security(("BearerAuth" = []))
)]
#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateGroupRequest>,
) -> ApiResult<HttpResponse> {
    let draft = NewGroup::try_from(payload.into_inner())?;
    let group = state.groups.create(caller.claims(), draft).await?;
    Ok(HttpResponse::Created().json(GroupResponse::from(group)))
}

/// Fetch one group.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group identifier")),
    responses(
        (status = 200, description = "Group", body = GroupResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Private group", body = ErrorSchema),
        (status = 404, description = "Group not found", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "getGroup",
    security(("BearerAuth" = []))
)]
#[get("/groups/{id}")]
pub async fn get_group(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<GroupPath>,
) -> ApiResult<web::Json<GroupResponse>> {
    let id = group_id(&path.id)?;
    let group = state.groups.get(caller.claims(), &id).await?;
    Ok(web::Json(group.into()))
}

/// Patch a group's descriptive fields.
#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group identifier")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Updated", body = GroupResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Group not found", body = ErrorSchema),
        (status = 409, description = "Name taken", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "updateGroup",
    security(("BearerAuth" = []))
)]
#[put("/groups/{id}")]
pub async fn update_group(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<GroupPath>,
    payload: web::Json<UpdateGroupRequest>,
) -> ApiResult<web::Json<GroupResponse>> {
    let id = group_id(&path.id)?;
    let patch = GroupPatch::try_from(payload.into_inner())?;
    let group = state.groups.update(caller.claims(), &id, patch).await?;
    Ok(web::Json(group.into()))
}

/// Delete a group. Projects referencing it are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Group not found", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "deleteGroup",
    security(("BearerAuth" = []))
)]
#[delete("/groups/{id}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<GroupPath>,
) -> ApiResult<HttpResponse> {
    let id = group_id(&path.id)?;
    state.groups.delete(caller.claims(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a user to a group.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{id}/members",
    params(("id" = String, Path, description = "Group identifier")),
    request_body = AddGroupMemberRequest,
    responses(
        (status = 200, description = "Member added", body = GroupResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Group or user not found", body = ErrorSchema),
        (status = 409, description = "Already a member", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "addGroupMember",
    security(("BearerAuth" = []))
)]
#[post("/groups/{id}/members")]
pub async fn add_group_member(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<GroupPath>,
    payload: web::Json<AddGroupMemberRequest>,
) -> ApiResult<web::Json<GroupResponse>> {
    let id = group_id(&path.id)?;
    let AddGroupMemberRequest {
        user_id,
        role_in_group,
    } = payload.into_inner();
    let user: UserId = parse_id(
        &require(user_id, FieldName::new("userId"))?,
        FieldName::new("userId"),
    )?;
    let role = parse_optional_enum(role_in_group.as_deref(), ROLE_IN_GROUP)?;
    let group = state
        .groups
        .add_member(caller.claims(), &id, user, role)
        .await?;
    Ok(web::Json(group.into()))
}

/// Change a member's role.
#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}/members/{user_id}",
    params(
        ("id" = String, Path, description = "Group identifier"),
        ("user_id" = String, Path, description = "Member's user identifier")
    ),
    request_body = UpdateGroupMemberRequest,
    responses(
        (status = 200, description = "Role changed", body = GroupResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Group or member not found", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "updateGroupMemberRole",
    security(("BearerAuth" = []))
)]
#[put("/groups/{id}/members/{user_id}")]
pub async fn update_group_member_role(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<MemberPath>,
    payload: web::Json<UpdateGroupMemberRequest>,
) -> ApiResult<web::Json<GroupResponse>> {
    let id = group_id(&path.id)?;
    let user: UserId = parse_id(&path.user_id, FieldName::new("userId"))?;
    let raw_role = require(payload.into_inner().role_in_group, ROLE_IN_GROUP)?;
    let role: GroupRole = parse_enum(&raw_role, ROLE_IN_GROUP)?;
    let group = state
        .groups
        .update_member_role(caller.claims(), &id, &user, role)
        .await?;
    Ok(web::Json(group.into()))
}

/// Remove a member from a group.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}/members/{user_id}",
    params(
        ("id" = String, Path, description = "Group identifier"),
        ("user_id" = String, Path, description = "Member's user identifier")
    ),
    responses(
        (status = 200, description = "Member removed", body = GroupResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Group or member not found", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "removeGroupMember",
    security(("BearerAuth" = []))
)]
#[delete("/groups/{id}/members/{user_id}")]
pub async fn remove_group_member(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<MemberPath>,
) -> ApiResult<web::Json<GroupResponse>> {
    let id = group_id(&path.id)?;
    let user: UserId = parse_id(&path.user_id, FieldName::new("userId"))?;
    let group = state
        .groups
        .remove_member(caller.claims(), &id, &user)
        .await?;
    Ok(web::Json(group.into()))
}
