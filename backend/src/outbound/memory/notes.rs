//! In-memory [`NoteRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{EmbeddedWrite, NoteRepository, NoteRepositoryError};
use crate::domain::{Attachment, AttachmentId, Note, NoteFilter, NoteId, NoteScope};

/// Note store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryNoteRepository {
    notes: RwLock<Vec<Note>>,
}

impl InMemoryNoteRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn insert(&self, note: &Note) -> Result<(), NoteRepositoryError> {
        self.notes.write().await.push(note.clone());
        Ok(())
    }

    async fn update_details(&self, note: &Note) -> Result<bool, NoteRepositoryError> {
        let mut notes = self.notes.write().await;
        let Some(slot) = notes.iter_mut().find(|n| n.id == note.id) else {
            return Ok(false);
        };
        let attachments = std::mem::take(&mut slot.attachments);
        *slot = note.clone();
        slot.attachments = attachments;
        Ok(true)
    }

    async fn find_by_id(&self, id: &NoteId) -> Result<Option<Note>, NoteRepositoryError> {
        Ok(self.notes.read().await.iter().find(|n| &n.id == id).cloned())
    }

    async fn list(
        &self,
        filter: &NoteFilter,
        scope: NoteScope,
    ) -> Result<Vec<Note>, NoteRepositoryError> {
        let mut listed: Vec<Note> = self
            .notes
            .read()
            .await
            .iter()
            .filter(|n| scope.admits(n) && filter.matches(n))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn delete(&self, id: &NoteId) -> Result<bool, NoteRepositoryError> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| &n.id != id);
        Ok(notes.len() != before)
    }

    async fn add_attachment(
        &self,
        id: &NoteId,
        attachment: Attachment,
        now: DateTime<Utc>,
    ) -> Result<Option<Note>, NoteRepositoryError> {
        let mut notes = self.notes.write().await;
        Ok(notes.iter_mut().find(|n| &n.id == id).map(|note| {
            note.attachments.push(attachment);
            note.updated_at = now;
            note.clone()
        }))
    }

    async fn remove_attachment(
        &self,
        id: &NoteId,
        attachment: &AttachmentId,
        now: DateTime<Utc>,
    ) -> Result<EmbeddedWrite<Note>, NoteRepositoryError> {
        let mut notes = self.notes.write().await;
        let Some(note) = notes.iter_mut().find(|n| &n.id == id) else {
            return Ok(EmbeddedWrite::Missing);
        };
        let before = note.attachments.len();
        note.attachments.retain(|a| &a.id != attachment);
        if note.attachments.len() == before {
            return Ok(EmbeddedWrite::ItemMissing);
        }
        note.updated_at = now;
        Ok(EmbeddedWrite::Applied(note.clone()))
    }
}
