//! Driving port for notes and their attachments.

use async_trait::async_trait;

use crate::domain::{
    AttachmentDraft, AttachmentId, BlobUpload, Claims, Error, NewNote, Note, NoteFilter, NoteId,
    NotePatch,
};

/// Note use-cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Create a note authored by the caller.
    async fn create(&self, claims: &Claims, draft: NewNote) -> Result<Note, Error>;

    /// Fetch one note the caller may see.
    async fn get(&self, claims: &Claims, id: &NoteId) -> Result<Note, Error>;

    /// Notes matching `filter` that the caller may see, newest first.
    async fn list(&self, claims: &Claims, filter: NoteFilter) -> Result<Vec<Note>, Error>;

    /// Patch a note.
    async fn update(&self, claims: &Claims, id: &NoteId, patch: NotePatch) -> Result<Note, Error>;

    /// Delete a note.
    async fn delete(&self, claims: &Claims, id: &NoteId) -> Result<(), Error>;

    /// Attach an already-stored blob.
    async fn add_attachment(
        &self,
        claims: &Claims,
        id: &NoteId,
        draft: AttachmentDraft,
    ) -> Result<Note, Error>;

    /// Store `upload` and attach it in one step.
    async fn upload_attachment(
        &self,
        claims: &Claims,
        id: &NoteId,
        upload: BlobUpload,
    ) -> Result<Note, Error>;

    /// Detach an attachment. The blob itself is kept.
    async fn remove_attachment(
        &self,
        claims: &Claims,
        id: &NoteId,
        attachment: &AttachmentId,
    ) -> Result<Note, Error>;
}
