//! Notes: authored documents bound to a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::wire_enum;
use super::{AttachmentId, BlobId, NoteId, ProjectId, SprintId, UserId};

wire_enum! {
    /// Markup used by a note's body.
    pub enum ContentFormat("content format") {
        Text => "text",
        Markdown => "markdown",
    }
}

wire_enum! {
    /// Publication state of a note.
    pub enum NoteStatus("note status") {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

/// Raised when a note title is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("note title must not be empty")]
pub struct EmptyTitle;

/// File attached to a note, referencing a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    pub name: String,
    pub file_id: BlobId,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A note.
///
/// ## Invariants
/// - `author` is set from the creating caller and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub content_format: ContentFormat,
    pub project: ProjectId,
    pub sprint: Option<SprintId>,
    pub author: UserId,
    pub tags: Vec<String>,
    pub status: NoteStatus,
    pub is_public: bool,
    pub pinned: bool,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a note authored by `author`.
    pub fn create(draft: NewNote, author: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: NoteId::random(),
            title: draft.title,
            content: draft.content,
            content_format: draft.content_format.unwrap_or(ContentFormat::Markdown),
            project: draft.project,
            sprint: draft.sprint,
            author,
            tags: normalise_tags(draft.tags),
            status: draft.status.unwrap_or(NoteStatus::Published),
            is_public: draft.is_public.unwrap_or(false),
            pinned: draft.pinned.unwrap_or(false),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Trim tags, drop empties and de-duplicate while keeping first occurrence.
///
/// # Examples
/// ```
/// use taskboard::domain::normalise_tags;
///
/// let tags = normalise_tags(vec![" api ".into(), "".into(), "api".into(), "db".into()]);
/// assert_eq!(tags, vec!["api".to_owned(), "db".to_owned()]);
/// ```
pub fn normalise_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() && !out.iter().any(|t| t == trimmed) {
            out.push(trimmed.to_owned());
        }
    }
    out
}

/// Fields accepted when creating a note. There is no author field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub content_format: Option<ContentFormat>,
    pub project: ProjectId,
    pub sprint: Option<SprintId>,
    pub tags: Vec<String>,
    pub status: Option<NoteStatus>,
    pub is_public: Option<bool>,
    pub pinned: Option<bool>,
}

impl NewNote {
    /// Check the title is present.
    pub fn validate(&self) -> Result<(), EmptyTitle> {
        if self.title.trim().is_empty() {
            return Err(EmptyTitle);
        }
        Ok(())
    }
}

/// Partial update of a note. There is no author field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_format: Option<ContentFormat>,
    pub sprint: Option<SprintId>,
    pub tags: Option<Vec<String>>,
    pub status: Option<NoteStatus>,
    pub is_public: Option<bool>,
    pub pinned: Option<bool>,
}

impl NotePatch {
    /// Apply the patch to `note`, stamping `updated_at`.
    pub fn apply(self, note: &mut Note, now: DateTime<Utc>) -> Result<(), EmptyTitle> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err(EmptyTitle);
            }
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(format) = self.content_format {
            note.content_format = format;
        }
        if let Some(sprint) = self.sprint {
            note.sprint = Some(sprint);
        }
        if let Some(tags) = self.tags {
            note.tags = normalise_tags(tags);
        }
        if let Some(status) = self.status {
            note.status = status;
        }
        if let Some(is_public) = self.is_public {
            note.is_public = is_public;
        }
        if let Some(pinned) = self.pinned {
            note.pinned = pinned;
        }
        note.updated_at = now;
        Ok(())
    }
}

/// Metadata for attaching an already-stored blob to a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDraft {
    pub name: String,
    pub file_id: BlobId,
    pub mime_type: String,
}

impl AttachmentDraft {
    /// Stamp the draft with a fresh id and upload time.
    pub fn into_attachment(self, now: DateTime<Utc>) -> Attachment {
        Attachment {
            id: AttachmentId::random(),
            name: self.name,
            file_id: self.file_id,
            mime_type: self.mime_type,
            uploaded_at: now,
        }
    }
}

/// Optional predicates narrowing a note listing.
///
/// All supplied predicates must hold; `tags` matches when the note carries
/// any of the listed tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub project: Option<ProjectId>,
    pub sprint: Option<SprintId>,
    pub author: Option<UserId>,
    pub tags: Vec<String>,
    pub status: Option<NoteStatus>,
}

impl NoteFilter {
    /// Whether `note` satisfies every supplied predicate.
    pub fn matches(&self, note: &Note) -> bool {
        self.project.is_none_or(|p| note.project == p)
            && self.sprint.is_none_or(|s| note.sprint == Some(s))
            && self.author.is_none_or(|a| note.author == a)
            && self.status.is_none_or(|s| note.status == s)
            && (self.tags.is_empty() || self.tags.iter().any(|t| note.tags.contains(t)))
    }
}

/// Visibility restriction applied on top of a [`NoteFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope {
    /// Every note.
    All,
    /// Notes authored by the user, plus public notes.
    VisibleTo(UserId),
}

impl NoteScope {
    /// Whether `note` is inside the scope.
    pub fn admits(&self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::VisibleTo(user) => note.is_public || &note.author == user,
        }
    }
}
