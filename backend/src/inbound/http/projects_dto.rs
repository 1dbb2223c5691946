//! Request and response payloads for the project handlers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CompletionPercentage, EntityName, Error, KanbanColumn, KanbanColumnDraft, Member, NewProject,
    NewSprint, Project, ProjectMetrics, ProjectPatch, ProjectRole, Sprint, SprintProgress,
    UserId, build_board,
};
use crate::inbound::http::validation::{
    FieldName, invalid_field, parse_id, parse_optional_date, parse_optional_enum, require,
};

const NAME: FieldName = FieldName::new("name");
const KANBAN_COLUMNS: FieldName = FieldName::new("kanbanColumns");
const MEMBERS: FieldName = FieldName::new("members");
const COMPLETION: FieldName = FieldName::new("completionPercentage");

fn parse_name(raw: String) -> Result<EntityName, Error> {
    EntityName::new(raw).map_err(|err| invalid_field(NAME, err))
}

fn parse_completion(raw: Option<u8>) -> Result<Option<CompletionPercentage>, Error> {
    raw.map(|value| CompletionPercentage::new(value).map_err(|err| invalid_field(COMPLETION, err)))
        .transpose()
}

/// A board column as supplied by clients; order comes from position.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KanbanColumnRequest {
    #[schema(example = "In progress")]
    pub name: String,
    pub wip_limit: Option<u32>,
}

fn parse_board(columns: Vec<KanbanColumnRequest>) -> Result<Vec<KanbanColumn>, Error> {
    build_board(
        columns
            .into_iter()
            .map(|c| KanbanColumnDraft {
                name: c.name,
                wip_limit: c.wip_limit,
            })
            .collect(),
    )
    .map_err(|err| invalid_field(KANBAN_COLUMNS, err))
}

/// Initial member listed in a create request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectMemberRequest {
    pub user_id: Option<String>,
    #[schema(example = "developer")]
    pub role_in_project: Option<String>,
}

impl ProjectMemberRequest {
    fn parse(self) -> Result<(UserId, Option<ProjectRole>), Error> {
        let field = FieldName::new("userId");
        let user = parse_id(&require(self.user_id, field)?, field)?;
        let role =
            parse_optional_enum(self.role_in_project.as_deref(), FieldName::new("roleInProject"))?;
        Ok((user, role))
    }
}

fn parse_members(
    members: Vec<ProjectMemberRequest>,
) -> Result<Vec<(UserId, ProjectRole)>, Error> {
    let mut seen = HashSet::with_capacity(members.len());
    members
        .into_iter()
        .map(|member| {
            let (user, role) = member.parse()?;
            if !seen.insert(user) {
                return Err(invalid_field(MEMBERS, format!("user {user} is listed twice")));
            }
            Ok((user, role.unwrap_or(ProjectRole::Developer)))
        })
        .collect()
}

/// Request payload for creating a project.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProjectRequest {
    #[schema(example = "P1")]
    pub name: Option<String>,
    pub description: Option<String>,
    pub group_id: Option<String>,
    #[schema(example = "planning")]
    pub status: Option<String>,
    #[schema(example = "scrum")]
    pub methodology: Option<String>,
    #[schema(example = "medium")]
    pub priority: Option<String>,
    pub start_date: Option<String>,
    pub target_end_date: Option<String>,
    pub tags: Option<Vec<String>>,
    pub members: Option<Vec<ProjectMemberRequest>>,
    pub kanban_columns: Option<Vec<KanbanColumnRequest>>,
}

impl TryFrom<CreateProjectRequest> for NewProject {
    type Error = Error;

    fn try_from(value: CreateProjectRequest) -> Result<Self, Self::Error> {
        let group_field = FieldName::new("groupId");
        Ok(Self {
            name: parse_name(require(value.name, NAME)?)?,
            description: value.description,
            group: parse_id(&require(value.group_id, group_field)?, group_field)?,
            status: parse_optional_enum(value.status.as_deref(), FieldName::new("status"))?,
            methodology: parse_optional_enum(
                value.methodology.as_deref(),
                FieldName::new("methodology"),
            )?,
            priority: parse_optional_enum(value.priority.as_deref(), FieldName::new("priority"))?,
            start_date: parse_optional_date(
                value.start_date.as_deref(),
                FieldName::new("startDate"),
            )?,
            target_end_date: parse_optional_date(
                value.target_end_date.as_deref(),
                FieldName::new("targetEndDate"),
            )?,
            tags: value.tags.unwrap_or_default(),
            members: parse_members(value.members.unwrap_or_default())?,
            kanban_columns: parse_board(value.kanban_columns.unwrap_or_default())?,
        })
    }
}

/// Agile counters as sent by clients.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetricsPayload {
    pub velocity: u32,
    pub story_points_completed: u32,
    pub story_points_total: u32,
}

impl From<MetricsPayload> for ProjectMetrics {
    fn from(value: MetricsPayload) -> Self {
        Self {
            velocity: value.velocity,
            story_points_completed: value.story_points_completed,
            story_points_total: value.story_points_total,
        }
    }
}

impl From<ProjectMetrics> for MetricsPayload {
    fn from(value: ProjectMetrics) -> Self {
        Self {
            velocity: value.velocity,
            story_points_completed: value.story_points_completed,
            story_points_total: value.story_points_total,
        }
    }
}

/// Request payload for patching a project.
///
/// Members and sprints have their own endpoints.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub group_id: Option<String>,
    pub status: Option<String>,
    pub methodology: Option<String>,
    pub priority: Option<String>,
    pub start_date: Option<String>,
    pub target_end_date: Option<String>,
    pub actual_end_date: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metrics: Option<MetricsPayload>,
    pub is_active: Option<bool>,
    pub kanban_columns: Option<Vec<KanbanColumnRequest>>,
}

impl TryFrom<UpdateProjectRequest> for ProjectPatch {
    type Error = Error;

    fn try_from(value: UpdateProjectRequest) -> Result<Self, Self::Error> {
        let group_field = FieldName::new("groupId");
        Ok(Self {
            name: value.name.map(parse_name).transpose()?,
            description: value.description,
            group: value
                .group_id
                .as_deref()
                .map(|raw| parse_id(raw, group_field))
                .transpose()?,
            status: parse_optional_enum(value.status.as_deref(), FieldName::new("status"))?,
            methodology: parse_optional_enum(
                value.methodology.as_deref(),
                FieldName::new("methodology"),
            )?,
            priority: parse_optional_enum(value.priority.as_deref(), FieldName::new("priority"))?,
            start_date: parse_optional_date(
                value.start_date.as_deref(),
                FieldName::new("startDate"),
            )?,
            target_end_date: parse_optional_date(
                value.target_end_date.as_deref(),
                FieldName::new("targetEndDate"),
            )?,
            actual_end_date: parse_optional_date(
                value.actual_end_date.as_deref(),
                FieldName::new("actualEndDate"),
            )?,
            tags: value.tags,
            metrics: value.metrics.map(ProjectMetrics::from),
            is_active: value.is_active,
            kanban_columns: value.kanban_columns.map(parse_board).transpose()?,
        })
    }
}

/// Request payload for `POST /projects/{id}/members`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddProjectMemberRequest {
    pub user_id: Option<String>,
    #[schema(example = "tester")]
    pub role_in_project: Option<String>,
}

impl AddProjectMemberRequest {
    pub(crate) fn parse(self) -> Result<(UserId, Option<ProjectRole>), Error> {
        ProjectMemberRequest {
            user_id: self.user_id,
            role_in_project: self.role_in_project,
        }
        .parse()
    }
}

/// Request payload for `POST /projects/{id}/sprints`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSprintRequest {
    #[schema(example = "Sprint 1")]
    pub name: Option<String>,
    pub goal: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[schema(example = "planning")]
    pub status: Option<String>,
    pub completion_percentage: Option<u8>,
}

impl TryFrom<CreateSprintRequest> for NewSprint {
    type Error = Error;

    fn try_from(value: CreateSprintRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: require(value.name, NAME)?,
            goal: value.goal,
            start_date: parse_optional_date(
                value.start_date.as_deref(),
                FieldName::new("startDate"),
            )?,
            end_date: parse_optional_date(value.end_date.as_deref(), FieldName::new("endDate"))?,
            status: parse_optional_enum(value.status.as_deref(), FieldName::new("status"))?,
            completion_percentage: parse_completion(value.completion_percentage)?,
        })
    }
}

/// Request payload for `PATCH /projects/{id}/sprints/{sprintId}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSprintRequest {
    #[schema(example = "in-progress")]
    pub status: Option<String>,
    pub completion_percentage: Option<u8>,
}

impl TryFrom<UpdateSprintRequest> for SprintProgress {
    type Error = Error;

    fn try_from(value: UpdateSprintRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_optional_enum(value.status.as_deref(), FieldName::new("status"))?,
            completion_percentage: parse_completion(value.completion_percentage)?,
        })
    }
}

/// One entry of a project's member list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberResponse {
    pub user_id: String,
    pub role_in_project: String,
    pub joined_at: String,
}

impl From<&Member<ProjectRole>> for ProjectMemberResponse {
    fn from(member: &Member<ProjectRole>) -> Self {
        Self {
            user_id: member.user_id.to_string(),
            role_in_project: member.role.as_str().to_owned(),
            joined_at: member.joined_at.to_rfc3339(),
        }
    }
}

/// Sprint embedded in a project response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SprintResponse {
    pub id: String,
    pub name: String,
    pub goal: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: String,
    pub completion_percentage: u8,
}

impl From<Sprint> for SprintResponse {
    fn from(sprint: Sprint) -> Self {
        Self {
            id: sprint.id.to_string(),
            name: sprint.name,
            goal: sprint.goal,
            start_date: sprint.start_date.map(|d| d.to_string()),
            end_date: sprint.end_date.map(|d| d.to_string()),
            status: sprint.status.as_str().to_owned(),
            completion_percentage: sprint.completion_percentage.value(),
        }
    }
}

/// Kanban column in board order.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumnResponse {
    pub name: String,
    pub order: u32,
    pub wip_limit: Option<u32>,
}

impl From<KanbanColumn> for KanbanColumnResponse {
    fn from(column: KanbanColumn) -> Self {
        Self {
            name: column.name,
            order: column.order,
            wip_limit: column.wip_limit,
        }
    }
}

/// Response payload for a project.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub group_id: String,
    pub status: String,
    pub methodology: String,
    pub priority: String,
    pub start_date: Option<String>,
    pub target_end_date: Option<String>,
    pub actual_end_date: Option<String>,
    pub tags: Vec<String>,
    pub metrics: MetricsPayload,
    pub is_active: bool,
    pub members: Vec<ProjectMemberResponse>,
    pub sprints: Vec<SprintResponse>,
    pub kanban_columns: Vec<KanbanColumnResponse>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.to_string(),
            name: project.name.to_string(),
            description: project.description,
            group_id: project.group.to_string(),
            status: project.status.as_str().to_owned(),
            methodology: project.methodology.as_str().to_owned(),
            priority: project.priority.as_str().to_owned(),
            start_date: project.start_date.map(|d| d.to_string()),
            target_end_date: project.target_end_date.map(|d| d.to_string()),
            actual_end_date: project.actual_end_date.map(|d| d.to_string()),
            tags: project.tags,
            metrics: project.metrics.into(),
            is_active: project.is_active,
            members: project.members.iter().map(ProjectMemberResponse::from).collect(),
            sprints: project.sprints.into_iter().map(SprintResponse::from).collect(),
            kanban_columns: project
                .kanban_columns
                .into_iter()
                .map(KanbanColumnResponse::from)
                .collect(),
            created_by: project.created_by.to_string(),
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Methodology, ProjectStatus, SprintStatus};
    use rstest::rstest;
    use serde_json::Value;

    fn field_of(error: &Error) -> Option<&str> {
        error.details().and_then(|d| d.get("field")).and_then(Value::as_str)
    }

    fn create_request() -> CreateProjectRequest {
        CreateProjectRequest {
            name: Some("P1".into()),
            group_id: Some(UserId::random().to_string()),
            ..CreateProjectRequest::default()
        }
    }

    fn column(name: &str, wip_limit: Option<u32>) -> KanbanColumnRequest {
        KanbanColumnRequest {
            name: name.into(),
            wip_limit,
        }
    }

    fn member(user: UserId, role: Option<&str>) -> ProjectMemberRequest {
        ProjectMemberRequest {
            user_id: Some(user.to_string()),
            role_in_project: role.map(str::to_owned),
        }
    }

    #[test]
    fn create_parses_enums_members_and_board() {
        let alice = UserId::random();
        let draft = NewProject::try_from(CreateProjectRequest {
            status: Some("active".into()),
            methodology: Some("kanban".into()),
            members: Some(vec![member(alice, None)]),
            kanban_columns: Some(vec![column("Todo", None), column("Doing", Some(3))]),
            ..create_request()
        })
        .expect("valid draft");

        assert_eq!(draft.status, Some(ProjectStatus::Active));
        assert_eq!(draft.methodology, Some(Methodology::Kanban));
        assert_eq!(draft.members, vec![(alice, ProjectRole::Developer)]);
        let orders: Vec<u32> = draft.kanban_columns.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[rstest]
    #[case(CreateProjectRequest { group_id: None, ..create_request() }, "groupId")]
    #[case(CreateProjectRequest { status: Some("paused".into()), ..create_request() }, "status")]
    #[case(CreateProjectRequest { start_date: Some("soon".into()), ..create_request() }, "startDate")]
    #[case(
        CreateProjectRequest { kanban_columns: Some(vec![column("Todo", None), column(" Todo ", None)]), ..create_request() },
        "kanbanColumns"
    )]
    #[case(
        CreateProjectRequest { kanban_columns: Some(vec![column("Todo", Some(0))]), ..create_request() },
        "kanbanColumns"
    )]
    fn create_reports_the_bad_field(#[case] request: CreateProjectRequest, #[case] field: &str) {
        let err = NewProject::try_from(request).expect_err("invalid");
        assert_eq!(field_of(&err), Some(field));
    }

    #[test]
    fn duplicate_initial_members_are_rejected() {
        let bob = UserId::random();
        let err = NewProject::try_from(CreateProjectRequest {
            members: Some(vec![member(bob, Some("tester")), member(bob, None)]),
            ..create_request()
        })
        .expect_err("duplicate member");
        assert_eq!(field_of(&err), Some("members"));
    }

    #[rstest]
    #[case(Some(101), false)]
    #[case(Some(100), true)]
    #[case(None, true)]
    fn sprint_completion_is_bounded(#[case] completion: Option<u8>, #[case] ok: bool) {
        let result = SprintProgress::try_from(UpdateSprintRequest {
            status: Some("review".into()),
            completion_percentage: completion,
        });
        assert_eq!(result.is_ok(), ok);
        if let Ok(progress) = result {
            assert_eq!(progress.status, Some(SprintStatus::Review));
        }
    }

    #[test]
    fn sprint_name_is_required() {
        let err = NewSprint::try_from(CreateSprintRequest::default()).expect_err("no name");
        assert_eq!(field_of(&err), Some("name"));
    }
}
