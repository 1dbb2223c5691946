//! Internal Diesel row structs and their conversions to domain aggregates.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Enum columns hold the wire text of the
//! domain enums; embedded lists are JSONB.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::domain::{
    BlobId, EmailAddress, EntityName, Group, GroupId, Note, NoteId, PasswordHash, Project,
    ProjectId, SprintId, User, UserId, Username,
};

use super::schema::{groups, notes, projects, users};

/// A stored value could not be converted to or from its domain form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column {column} holds an invalid value: {message}")]
pub(crate) struct RowCodecError {
    column: &'static str,
    message: String,
}

fn column<T, E: Display>(column: &'static str, result: Result<T, E>) -> Result<T, RowCodecError> {
    result.map_err(|err| RowCodecError {
        column,
        message: err.to_string(),
    })
}

fn from_json<T: DeserializeOwned>(
    name: &'static str,
    value: serde_json::Value,
) -> Result<T, RowCodecError> {
    column(name, serde_json::from_value(value))
}

pub(crate) fn to_json<T: Serialize>(
    name: &'static str,
    value: &T,
) -> Result<serde_json::Value, RowCodecError> {
    column(name, serde_json::to_value(value))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Full users row, used for reads, inserts and whole-record updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub profile: serde_json::Value,
    pub image_id: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn from_domain(user: &User) -> Result<Self, RowCodecError> {
        Ok(Self {
            id: *user.id.as_uuid(),
            username: user.username.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            password_hash: user.password_hash.as_str().to_owned(),
            role: user.role.as_str().to_owned(),
            status: user.status.as_str().to_owned(),
            profile: to_json("profile", &user.profile)?,
            image_id: user.image_id.map(|id| *id.as_uuid()),
            joined_at: user.joined_at,
            updated_at: user.updated_at,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = RowCodecError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: column("username", Username::new(row.username))?,
            email: column("email", EmailAddress::new(&row.email))?,
            password_hash: PasswordHash::new(row.password_hash),
            role: column("role", row.role.parse())?,
            status: column("status", row.status.parse())?,
            profile: from_json("profile", row.profile)?,
            image_id: row.image_id.map(BlobId::from_uuid),
            joined_at: row.joined_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub visibility: String,
    pub icon: Option<String>,
    pub is_active: bool,
    pub members: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Descriptive group columns; `members` is only written by membership ops.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = groups)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GroupDetails<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub visibility: &'a str,
    pub icon: Option<&'a str>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl GroupRow {
    pub(crate) fn from_domain(group: &Group) -> Result<Self, RowCodecError> {
        Ok(Self {
            id: *group.id.as_uuid(),
            name: group.name.as_str().to_owned(),
            description: group.description.clone(),
            visibility: group.visibility.as_str().to_owned(),
            icon: group.icon.clone(),
            is_active: group.is_active,
            members: to_json("members", &group.members)?,
            created_by: *group.created_by.as_uuid(),
            created_at: group.created_at,
            updated_at: group.updated_at,
        })
    }
}

impl<'a> From<&'a Group> for GroupDetails<'a> {
    fn from(group: &'a Group) -> Self {
        Self {
            name: group.name.as_str(),
            description: group.description.as_deref(),
            visibility: group.visibility.as_str(),
            icon: group.icon.as_deref(),
            is_active: group.is_active,
            updated_at: group.updated_at,
        }
    }
}

impl TryFrom<GroupRow> for Group {
    type Error = RowCodecError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GroupId::from_uuid(row.id),
            name: column("name", EntityName::new(&row.name))?,
            description: row.description,
            visibility: column("visibility", row.visibility.parse())?,
            icon: row.icon,
            is_active: row.is_active,
            members: from_json("members", row.members)?,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub group_id: Uuid,
    pub status: String,
    pub methodology: String,
    pub priority: String,
    pub start_date: Option<NaiveDate>,
    pub target_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub metrics: serde_json::Value,
    pub is_active: bool,
    pub members: serde_json::Value,
    pub sprints: serde_json::Value,
    pub kanban_columns: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project columns other than `members` and `sprints`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProjectDetails<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub group_id: Uuid,
    pub status: &'a str,
    pub methodology: &'a str,
    pub priority: &'a str,
    pub start_date: Option<NaiveDate>,
    pub target_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub tags: &'a [String],
    pub metrics: serde_json::Value,
    pub is_active: bool,
    pub kanban_columns: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    pub(crate) fn from_domain(project: &Project) -> Result<Self, RowCodecError> {
        Ok(Self {
            id: *project.id.as_uuid(),
            name: project.name.as_str().to_owned(),
            description: project.description.clone(),
            group_id: *project.group.as_uuid(),
            status: project.status.as_str().to_owned(),
            methodology: project.methodology.as_str().to_owned(),
            priority: project.priority.as_str().to_owned(),
            start_date: project.start_date,
            target_end_date: project.target_end_date,
            actual_end_date: project.actual_end_date,
            tags: project.tags.clone(),
            metrics: to_json("metrics", &project.metrics)?,
            is_active: project.is_active,
            members: to_json("members", &project.members)?,
            sprints: to_json("sprints", &project.sprints)?,
            kanban_columns: to_json("kanban_columns", &project.kanban_columns)?,
            created_by: *project.created_by.as_uuid(),
            created_at: project.created_at,
            updated_at: project.updated_at,
        })
    }
}

impl<'a> ProjectDetails<'a> {
    pub(crate) fn from_domain(project: &'a Project) -> Result<Self, RowCodecError> {
        Ok(Self {
            name: project.name.as_str(),
            description: project.description.as_deref(),
            group_id: *project.group.as_uuid(),
            status: project.status.as_str(),
            methodology: project.methodology.as_str(),
            priority: project.priority.as_str(),
            start_date: project.start_date,
            target_end_date: project.target_end_date,
            actual_end_date: project.actual_end_date,
            tags: &project.tags,
            metrics: to_json("metrics", &project.metrics)?,
            is_active: project.is_active,
            kanban_columns: to_json("kanban_columns", &project.kanban_columns)?,
            updated_at: project.updated_at,
        })
    }
}

impl TryFrom<ProjectRow> for Project {
    type Error = RowCodecError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProjectId::from_uuid(row.id),
            name: column("name", EntityName::new(&row.name))?,
            description: row.description,
            group: GroupId::from_uuid(row.group_id),
            status: column("status", row.status.parse())?,
            methodology: column("methodology", row.methodology.parse())?,
            priority: column("priority", row.priority.parse())?,
            start_date: row.start_date,
            target_end_date: row.target_end_date,
            actual_end_date: row.actual_end_date,
            tags: row.tags,
            metrics: from_json("metrics", row.metrics)?,
            is_active: row.is_active,
            members: from_json("members", row.members)?,
            sprints: from_json("sprints", row.sprints)?,
            kanban_columns: from_json("kanban_columns", row.kanban_columns)?,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NoteRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub content_format: String,
    pub project_id: Uuid,
    pub sprint_id: Option<Uuid>,
    pub author_id: Uuid,
    pub tags: Vec<String>,
    pub status: String,
    pub is_public: bool,
    pub pinned: bool,
    pub attachments: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Note columns other than author and attachments.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = notes)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NoteDetails<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub content_format: &'a str,
    pub project_id: Uuid,
    pub sprint_id: Option<Uuid>,
    pub tags: &'a [String],
    pub status: &'a str,
    pub is_public: bool,
    pub pinned: bool,
    pub updated_at: DateTime<Utc>,
}

impl NoteRow {
    pub(crate) fn from_domain(note: &Note) -> Result<Self, RowCodecError> {
        Ok(Self {
            id: *note.id.as_uuid(),
            title: note.title.clone(),
            content: note.content.clone(),
            content_format: note.content_format.as_str().to_owned(),
            project_id: *note.project.as_uuid(),
            sprint_id: note.sprint.map(|id| *id.as_uuid()),
            author_id: *note.author.as_uuid(),
            tags: note.tags.clone(),
            status: note.status.as_str().to_owned(),
            is_public: note.is_public,
            pinned: note.pinned,
            attachments: to_json("attachments", &note.attachments)?,
            created_at: note.created_at,
            updated_at: note.updated_at,
        })
    }
}

impl<'a> From<&'a Note> for NoteDetails<'a> {
    fn from(note: &'a Note) -> Self {
        Self {
            title: &note.title,
            content: &note.content,
            content_format: note.content_format.as_str(),
            project_id: *note.project.as_uuid(),
            sprint_id: note.sprint.map(|id| *id.as_uuid()),
            tags: &note.tags,
            status: note.status.as_str(),
            is_public: note.is_public,
            pinned: note.pinned,
            updated_at: note.updated_at,
        }
    }
}

impl TryFrom<NoteRow> for Note {
    type Error = RowCodecError;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NoteId::from_uuid(row.id),
            title: row.title,
            content: row.content,
            content_format: column("content_format", row.content_format.parse())?,
            project: ProjectId::from_uuid(row.project_id),
            sprint: row.sprint_id.map(SprintId::from_uuid),
            author: UserId::from_uuid(row.author_id),
            tags: row.tags,
            status: column("status", row.status.parse())?,
            is_public: row.is_public,
            pinned: row.pinned,
            attachments: from_json("attachments", row.attachments)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{group, note, project, user};
    use crate::domain::{GroupRole, Role, Visibility};

    #[test]
    fn user_row_round_trips_through_domain() {
        let mut alice = user("alice", Role::DevopsEngineer);
        alice.image_id = Some(BlobId::random());
        let row = UserRow::from_domain(&alice).expect("encode");

        assert_eq!(row.role, "devops-engineer");
        assert_eq!(User::try_from(row).expect("decode"), alice);
    }

    #[test]
    fn group_members_are_stored_as_camel_case_objects() {
        let owner = UserId::random();
        let stored = group("Platform", Visibility::Private, &[owner]);
        let row = GroupRow::from_domain(&stored).expect("encode");

        let first = row.members.get(0).expect("creator listed");
        assert_eq!(first["userId"], serde_json::json!(owner.to_string()));
        assert_eq!(first["role"], serde_json::json!(GroupRole::Member.as_str()));
        assert_eq!(Group::try_from(row).expect("decode"), stored);
    }

    #[test]
    fn project_and_note_rows_decode_back() {
        let mut stored = project("Apollo", GroupId::random(), &[UserId::random()]);
        stored.tags = vec!["launch".into()];
        let row = ProjectRow::from_domain(&stored).expect("encode");
        assert_eq!(Project::try_from(row).expect("decode"), stored);

        let written = note(UserId::random(), stored.id, true);
        let row = NoteRow::from_domain(&written).expect("encode");
        assert_eq!(Note::try_from(row).expect("decode"), written);
    }

    #[test]
    fn unknown_enum_text_is_reported_with_its_column() {
        let mut row = UserRow::from_domain(&user("bob", Role::User)).expect("encode");
        row.status = "retired".into();
        let err = User::try_from(row).expect_err("bad status");
        assert!(err.to_string().contains("column status"));
    }
}
