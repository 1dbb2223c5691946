//! Note store service.
//!
//! The author is always the caller at creation and never changes after. Reads
//! are gated by [`can_view_note`]; every write, attachments included, by
//! [`can_mutate_note`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::access::{Capability, can_mutate_note, can_view_note, ensure, has_capability};
use crate::domain::ports::{BlobStore, EmbeddedWrite, NoteRepository, NoteStore, ProjectRepository};
use crate::domain::repository_errors::{map_blob_error, map_note_error, map_project_error};
use crate::domain::{
    AttachmentDraft, AttachmentId, BlobUpload, Claims, Error, NewNote, Note, NoteFilter, NoteId,
    NotePatch, NoteScope, ProjectId, SprintId,
};

const MUTATION_DENIED: &str = "only the author or an administrator may change this note";

/// Service implementing [`NoteStore`].
#[derive(Clone)]
pub struct NoteStoreService<N, P, B> {
    notes: Arc<N>,
    projects: Arc<P>,
    blobs: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<N, P, B> NoteStoreService<N, P, B> {
    /// Create a note store.
    pub fn new(notes: Arc<N>, projects: Arc<P>, blobs: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notes,
            projects,
            blobs,
            clock,
        }
    }
}

impl<N, P, B> NoteStoreService<N, P, B>
where
    N: NoteRepository,
    P: ProjectRepository,
    B: BlobStore,
{
    async fn load(&self, id: &NoteId) -> Result<Note, Error> {
        self.notes
            .find_by_id(id)
            .await
            .map_err(map_note_error)?
            .ok_or_else(|| Error::not_found("note not found"))
    }

    async fn load_for_write(&self, claims: &Claims, id: &NoteId) -> Result<Note, Error> {
        let note = self.load(id).await?;
        ensure(can_mutate_note(claims, &note), MUTATION_DENIED)?;
        Ok(note)
    }

    /// Check the project exists and, when given, that it embeds `sprint`.
    async fn check_placement(
        &self,
        project: &ProjectId,
        sprint: Option<&SprintId>,
    ) -> Result<(), Error> {
        let found = self
            .projects
            .find_by_id(project)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found("project not found"))?;
        if let Some(sprint) = sprint
            && !found.has_sprint(sprint)
        {
            return Err(Error::invalid_request(
                "sprint does not belong to the note's project",
            ));
        }
        Ok(())
    }

    async fn attach(
        &self,
        id: &NoteId,
        draft: AttachmentDraft,
    ) -> Result<Note, Error> {
        let now = self.clock.utc();
        self.notes
            .add_attachment(id, draft.into_attachment(now), now)
            .await
            .map_err(map_note_error)?
            .ok_or_else(|| Error::not_found("note not found"))
    }
}

#[async_trait]
impl<N, P, B> NoteStore for NoteStoreService<N, P, B>
where
    N: NoteRepository,
    P: ProjectRepository,
    B: BlobStore,
{
    async fn create(&self, claims: &Claims, draft: NewNote) -> Result<Note, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.check_placement(&draft.project, draft.sprint.as_ref())
            .await?;
        let note = Note::create(draft, claims.user_id, self.clock.utc());
        self.notes.insert(&note).await.map_err(map_note_error)?;
        info!(note_id = %note.id, author = %note.author, "created note");
        Ok(note)
    }

    async fn get(&self, claims: &Claims, id: &NoteId) -> Result<Note, Error> {
        let note = self.load(id).await?;
        ensure(can_view_note(claims, &note), "note is private to its author")?;
        Ok(note)
    }

    async fn list(&self, claims: &Claims, filter: NoteFilter) -> Result<Vec<Note>, Error> {
        let scope = if has_capability(claims, Capability::ReadAll) {
            NoteScope::All
        } else {
            NoteScope::VisibleTo(claims.user_id)
        };
        self.notes
            .list(&filter, scope)
            .await
            .map_err(map_note_error)
    }

    async fn update(&self, claims: &Claims, id: &NoteId, patch: NotePatch) -> Result<Note, Error> {
        let mut note = self.load_for_write(claims, id).await?;
        if let Some(sprint) = &patch.sprint {
            self.check_placement(&note.project, Some(sprint)).await?;
        }
        patch
            .apply(&mut note, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if !self
            .notes
            .update_details(&note)
            .await
            .map_err(map_note_error)?
        {
            return Err(Error::not_found("note not found"));
        }
        Ok(note)
    }

    async fn delete(&self, claims: &Claims, id: &NoteId) -> Result<(), Error> {
        self.load_for_write(claims, id).await?;
        if !self.notes.delete(id).await.map_err(map_note_error)? {
            return Err(Error::not_found("note not found"));
        }
        Ok(())
    }

    async fn add_attachment(
        &self,
        claims: &Claims,
        id: &NoteId,
        draft: AttachmentDraft,
    ) -> Result<Note, Error> {
        self.load_for_write(claims, id).await?;
        if self
            .blobs
            .metadata(&draft.file_id)
            .await
            .map_err(map_blob_error)?
            .is_none()
        {
            return Err(Error::not_found("file not found"));
        }
        self.attach(id, draft).await
    }

    async fn upload_attachment(
        &self,
        claims: &Claims,
        id: &NoteId,
        upload: BlobUpload,
    ) -> Result<Note, Error> {
        self.load_for_write(claims, id).await?;
        let stored = self.blobs.put(upload).await.map_err(map_blob_error)?;
        let draft = AttachmentDraft {
            name: stored.filename.clone(),
            file_id: stored.id,
            mime_type: stored.content_type.clone(),
        };
        match self.attach(id, draft).await {
            Ok(note) => Ok(note),
            Err(err) => {
                warn!(blob_id = %stored.id, "attaching upload failed; removing blob");
                if let Err(cleanup) = self.blobs.delete(&stored.id).await {
                    warn!(blob_id = %stored.id, error = %cleanup, "failed to remove orphaned blob");
                }
                Err(err)
            }
        }
    }

    async fn remove_attachment(
        &self,
        claims: &Claims,
        id: &NoteId,
        attachment: &AttachmentId,
    ) -> Result<Note, Error> {
        self.load_for_write(claims, id).await?;
        match self
            .notes
            .remove_attachment(id, attachment, self.clock.utc())
            .await
            .map_err(map_note_error)?
        {
            EmbeddedWrite::Applied(note) => Ok(note),
            EmbeddedWrite::ItemMissing => Err(Error::not_found("attachment not found")),
            EmbeddedWrite::Missing => Err(Error::not_found("note not found")),
        }
    }
}

#[cfg(test)]
#[path = "note_store_service_tests.rs"]
mod tests;
