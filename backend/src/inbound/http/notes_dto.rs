//! Request and response payloads for the note handlers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Attachment, AttachmentDraft, Error, NewNote, Note, NoteFilter, NotePatch, normalise_tags,
};
use crate::inbound::http::validation::{
    FieldName, parse_id, parse_optional_enum, parse_optional_id, require,
};

const CONTENT_FORMAT: FieldName = FieldName::new("contentFormat");
const STATUS: FieldName = FieldName::new("status");
const SPRINT_ID: FieldName = FieldName::new("sprintId");

/// Request payload for creating a note. The author is always the caller.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateNoteRequest {
    #[schema(example = "Standup")]
    pub title: Option<String>,
    pub content: Option<String>,
    #[schema(example = "markdown")]
    pub content_format: Option<String>,
    pub project_id: Option<String>,
    pub sprint_id: Option<String>,
    pub tags: Option<Vec<String>>,
    #[schema(example = "published")]
    pub status: Option<String>,
    pub is_public: Option<bool>,
    pub pinned: Option<bool>,
    /// Accepted and discarded; the caller is always the author.
    #[serde(default, alias = "authorId", skip_serializing)]
    pub author: Option<serde_json::Value>,
}

impl TryFrom<CreateNoteRequest> for NewNote {
    type Error = Error;

    fn try_from(value: CreateNoteRequest) -> Result<Self, Self::Error> {
        let project_field = FieldName::new("projectId");
        Ok(Self {
            title: require(value.title, FieldName::new("title"))?,
            content: value.content.unwrap_or_default(),
            content_format: parse_optional_enum(value.content_format.as_deref(), CONTENT_FORMAT)?,
            project: parse_id(&require(value.project_id, project_field)?, project_field)?,
            sprint: parse_optional_id(value.sprint_id.as_deref(), SPRINT_ID)?,
            tags: value.tags.unwrap_or_default(),
            status: parse_optional_enum(value.status.as_deref(), STATUS)?,
            is_public: value.is_public,
            pinned: value.pinned,
        })
    }
}

/// Request payload for patching a note.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_format: Option<String>,
    pub sprint_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub is_public: Option<bool>,
    pub pinned: Option<bool>,
    /// Accepted and discarded; authorship never changes.
    #[serde(default, alias = "authorId", skip_serializing)]
    pub author: Option<serde_json::Value>,
}

impl TryFrom<UpdateNoteRequest> for NotePatch {
    type Error = Error;

    fn try_from(value: UpdateNoteRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            content: value.content,
            content_format: parse_optional_enum(value.content_format.as_deref(), CONTENT_FORMAT)?,
            sprint: parse_optional_id(value.sprint_id.as_deref(), SPRINT_ID)?,
            tags: value.tags,
            status: parse_optional_enum(value.status.as_deref(), STATUS)?,
            is_public: value.is_public,
            pinned: value.pinned,
        })
    }
}

/// Query string for `GET /notes`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct NoteListQuery {
    pub project_id: Option<String>,
    pub sprint_id: Option<String>,
    pub author_id: Option<String>,
    pub status: Option<String>,
    /// Comma-separated; a note matches when it carries any of them.
    #[param(example = "retro,backend")]
    pub tags: Option<String>,
}

impl TryFrom<NoteListQuery> for NoteFilter {
    type Error = Error;

    fn try_from(value: NoteListQuery) -> Result<Self, Self::Error> {
        let tags = value
            .tags
            .map(|raw| raw.split(',').map(str::to_owned).collect())
            .map(normalise_tags)
            .unwrap_or_default();
        Ok(Self {
            project: parse_optional_id(value.project_id.as_deref(), FieldName::new("projectId"))?,
            sprint: parse_optional_id(value.sprint_id.as_deref(), SPRINT_ID)?,
            author: parse_optional_id(value.author_id.as_deref(), FieldName::new("authorId"))?,
            tags,
            status: parse_optional_enum(value.status.as_deref(), STATUS)?,
        })
    }
}

/// Request payload attaching an already uploaded file.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddAttachmentRequest {
    #[schema(example = "diagram.png")]
    pub name: Option<String>,
    pub file_id: Option<String>,
    #[schema(example = "image/png")]
    pub mime_type: Option<String>,
}

impl TryFrom<AddAttachmentRequest> for AttachmentDraft {
    type Error = Error;

    fn try_from(value: AddAttachmentRequest) -> Result<Self, Self::Error> {
        let file_field = FieldName::new("fileId");
        Ok(Self {
            name: require(value.name, FieldName::new("name"))?,
            file_id: parse_id(&require(value.file_id, file_field)?, file_field)?,
            mime_type: require(value.mime_type, FieldName::new("mimeType"))?,
        })
    }
}

/// A file attached to a note.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: String,
    pub name: String,
    pub file_id: String,
    pub mime_type: String,
    pub uploaded_at: String,
}

impl From<Attachment> for AttachmentResponse {
    fn from(attachment: Attachment) -> Self {
        Self {
            id: attachment.id.to_string(),
            name: attachment.name,
            file_id: attachment.file_id.to_string(),
            mime_type: attachment.mime_type,
            uploaded_at: attachment.uploaded_at.to_rfc3339(),
        }
    }
}

/// Response payload for a note.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub content_format: String,
    pub project_id: String,
    pub sprint_id: Option<String>,
    pub author_id: String,
    pub tags: Vec<String>,
    pub status: String,
    pub is_public: bool,
    pub pinned: bool,
    pub attachments: Vec<AttachmentResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title,
            content: note.content,
            content_format: note.content_format.as_str().to_owned(),
            project_id: note.project.to_string(),
            sprint_id: note.sprint.map(|id| id.to_string()),
            author_id: note.author.to_string(),
            tags: note.tags,
            status: note.status.as_str().to_owned(),
            is_public: note.is_public,
            pinned: note.pinned,
            attachments: note
                .attachments
                .into_iter()
                .map(AttachmentResponse::from)
                .collect(),
            created_at: note.created_at.to_rfc3339(),
            updated_at: note.updated_at.to_rfc3339(),
        }
    }
}
