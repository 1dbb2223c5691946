//! PostgreSQL-backed `NoteRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::expression_methods::PgArrayExpressionMethods;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EmbeddedWrite, NoteRepository, NoteRepositoryError};
use crate::domain::{Attachment, AttachmentId, Note, NoteFilter, NoteId, NoteScope};

use super::diesel_basic_error_mapping::{
    DieselErrorMapping, codec_to_diesel, describe_codec_error, map_basic_diesel_error,
    map_basic_pool_error,
};
use super::models::{NoteDetails, NoteRow, RowCodecError, to_json};
use super::pool::{DbPool, PoolError};
use super::schema::notes;

/// Diesel-backed implementation of the `NoteRepository` port.
#[derive(Clone)]
pub struct DieselNoteRepository {
    pool: DbPool,
}

impl DieselNoteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NoteRepositoryError {
    map_basic_pool_error(error, NoteRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> NoteRepositoryError {
    // Notes carry no unique columns beyond the primary key.
    map_basic_diesel_error(
        error,
        DieselErrorMapping {
            query: NoteRepositoryError::query,
            connection: NoteRepositoryError::connection,
            duplicate: |_: Option<&str>| NoteRepositoryError::query("duplicate note id"),
        },
    )
}

fn map_codec_error(error: RowCodecError) -> NoteRepositoryError {
    NoteRepositoryError::query(describe_codec_error(&error))
}

fn decode(row: NoteRow) -> Result<Note, NoteRepositoryError> {
    Note::try_from(row).map_err(map_codec_error)
}

/// Rewrite the attachment list of a locked note.
enum AttachmentEdit<'a> {
    Push(Attachment),
    Remove(&'a AttachmentId),
}

impl DieselNoteRepository {
    async fn edit_attachments(
        &self,
        id: &NoteId,
        edit: AttachmentEdit<'_>,
        now: DateTime<Utc>,
    ) -> Result<EmbeddedWrite<Note>, NoteRepositoryError> {
        let key = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    let stored: Option<serde_json::Value> = notes::table
                        .find(key)
                        .select(notes::attachments)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(stored) = stored else {
                        return Ok(EmbeddedWrite::Missing);
                    };
                    let mut attachments: Vec<Attachment> = serde_json::from_value(stored)
                        .map_err(|err| DieselError::DeserializationError(Box::new(err)))?;
                    match edit {
                        AttachmentEdit::Push(attachment) => attachments.push(attachment),
                        AttachmentEdit::Remove(target) => {
                            let before = attachments.len();
                            attachments.retain(|a| &a.id != target);
                            if attachments.len() == before {
                                return Ok(EmbeddedWrite::ItemMissing);
                            }
                        }
                    }
                    let encoded = to_json("attachments", &attachments).map_err(codec_to_diesel)?;
                    let row = diesel::update(notes::table.find(key))
                        .set((notes::attachments.eq(encoded), notes::updated_at.eq(now)))
                        .returning(NoteRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok::<_, DieselError>(EmbeddedWrite::Applied(row))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        outcome.try_map(decode)
    }
}

#[async_trait]
impl NoteRepository for DieselNoteRepository {
    async fn insert(&self, note: &Note) -> Result<(), NoteRepositoryError> {
        let row = NoteRow::from_domain(note).map_err(map_codec_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_details(&self, note: &Note) -> Result<bool, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(notes::table.find(note.id.as_uuid()))
            .set(NoteDetails::from(note))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn find_by_id(&self, id: &NoteId) -> Result<Option<Note>, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        notes::table
            .find(id.as_uuid())
            .select(NoteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(decode)
            .transpose()
    }

    async fn list(
        &self,
        filter: &NoteFilter,
        scope: NoteScope,
    ) -> Result<Vec<Note>, NoteRepositoryError> {
        let mut query = notes::table.select(NoteRow::as_select()).into_boxed();
        if let Some(project) = filter.project {
            query = query.filter(notes::project_id.eq(*project.as_uuid()));
        }
        if let Some(sprint) = filter.sprint {
            query = query.filter(notes::sprint_id.eq(*sprint.as_uuid()));
        }
        if let Some(author) = filter.author {
            query = query.filter(notes::author_id.eq(*author.as_uuid()));
        }
        if let Some(status) = filter.status {
            query = query.filter(notes::status.eq(status.as_str()));
        }
        if !filter.tags.is_empty() {
            query = query.filter(notes::tags.overlaps_with(filter.tags.clone()));
        }
        if let NoteScope::VisibleTo(user) = scope {
            query = query.filter(
                notes::is_public
                    .eq(true)
                    .or(notes::author_id.eq(*user.as_uuid())),
            );
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NoteRow> = query
            .order_by((notes::created_at.desc(), notes::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn delete(&self, id: &NoteId) -> Result<bool, NoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(notes::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn add_attachment(
        &self,
        id: &NoteId,
        attachment: Attachment,
        now: DateTime<Utc>,
    ) -> Result<Option<Note>, NoteRepositoryError> {
        match self
            .edit_attachments(id, AttachmentEdit::Push(attachment), now)
            .await?
        {
            EmbeddedWrite::Applied(note) => Ok(Some(note)),
            EmbeddedWrite::ItemMissing | EmbeddedWrite::Missing => Ok(None),
        }
    }

    async fn remove_attachment(
        &self,
        id: &NoteId,
        attachment: &AttachmentId,
        now: DateTime<Utc>,
    ) -> Result<EmbeddedWrite<Note>, NoteRepositoryError> {
        self.edit_attachments(id, AttachmentEdit::Remove(attachment), now)
            .await
    }
}
