//! Port abstraction for note persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Attachment, AttachmentId, Note, NoteFilter, NoteId, NoteScope};

use super::{EmbeddedWrite, define_port_error};

define_port_error! {
    /// Persistence errors raised by note repository adapters.
    pub enum NoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "note repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "note repository query failed: {message}",
    }
}

/// Storage for notes with their embedded attachments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note.
    async fn insert(&self, note: &Note) -> Result<(), NoteRepositoryError>;

    /// Overwrite everything except author and attachments.
    /// Returns `false` when no record matched.
    async fn update_details(&self, note: &Note) -> Result<bool, NoteRepositoryError>;

    /// Fetch a note by identifier.
    async fn find_by_id(&self, id: &NoteId) -> Result<Option<Note>, NoteRepositoryError>;

    /// Notes inside `scope` that satisfy `filter`, newest first.
    async fn list(
        &self,
        filter: &NoteFilter,
        scope: NoteScope,
    ) -> Result<Vec<Note>, NoteRepositoryError>;

    /// Remove a note. Returns `false` when no record matched.
    async fn delete(&self, id: &NoteId) -> Result<bool, NoteRepositoryError>;

    /// Append an attachment. Returns `None` when the note does not exist.
    async fn add_attachment(
        &self,
        id: &NoteId,
        attachment: Attachment,
        now: DateTime<Utc>,
    ) -> Result<Option<Note>, NoteRepositoryError>;

    /// Remove one attachment by id.
    async fn remove_attachment(
        &self,
        id: &NoteId,
        attachment: &AttachmentId,
        now: DateTime<Utc>,
    ) -> Result<EmbeddedWrite<Note>, NoteRepositoryError>;
}
