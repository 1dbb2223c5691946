//! Note store HTTP handlers.
//!
//! ```text
//! GET /api/v1/notes?projectId=...&tags=retro,backend
//! POST /api/v1/notes {"title":"Standup","projectId":"..."}
//! GET /api/v1/notes/{id}
//! PUT /api/v1/notes/{id} {"isPublic":true}
//! DELETE /api/v1/notes/{id}
//! POST /api/v1/notes/{id}/attachments {"name":"a.png","fileId":"...","mimeType":"image/png"}
//! POST /api/v1/notes/{id}/attachments/upload?filename=a.png <raw bytes>
//! DELETE /api/v1/notes/{id}/attachments/{attachmentId}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use crate::domain::{AttachmentDraft, AttachmentId, Error, NewNote, NoteFilter, NoteId, NotePatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::blob_upload;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::notes_dto::{
    AddAttachmentRequest, CreateNoteRequest, NoteListQuery, NoteResponse, UpdateNoteRequest,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users_dto::UploadQuery;
use crate::inbound::http::validation::{FieldName, parse_id};

#[derive(Debug, Deserialize)]
struct NotePath {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AttachmentPath {
    id: String,
    attachment_id: String,
}

fn note_id(raw: &str) -> Result<NoteId, Error> {
    parse_id(raw, FieldName::new("id"))
}

/// List notes visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notes",
    params(NoteListQuery),
    responses(
        (status = 200, description = "Notes", body = [NoteResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "listNotes",
    security(("BearerAuth" = []))
)]
#[get("/notes")]
pub async fn list_notes(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<NoteListQuery>,
) -> ApiResult<web::Json<Vec<NoteResponse>>> {
    let filter = NoteFilter::try_from(query.into_inner())?;
    let notes = state.notes.list(caller.claims(), filter).await?;
    Ok(web::Json(notes.into_iter().map(NoteResponse::from).collect()))
}

/// Create a note authored by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Created", body = NoteResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Project not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "createNote",
    security(("BearerAuth" = []))
)]
#[post("/notes")]
pub async fn create_note(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateNoteRequest>,
) -> ApiResult<HttpResponse> {
    let draft = NewNote::try_from(payload.into_inner())?;
    let note = state.notes.create(caller.claims(), draft).await?;
    Ok(HttpResponse::Created().json(NoteResponse::from(note)))
}

/// Fetch one note.
#[utoipa::path(
    get,
    path = "/api/v1/notes/{id}",
    params(("id" = String, Path, description = "Note identifier")),
    responses(
        (status = 200, description = "Note", body = NoteResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Private note", body = ErrorSchema),
        (status = 404, description = "Note not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "getNote",
    security(("BearerAuth" = []))
)]
#[get("/notes/{id}")]
pub async fn get_note(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<NotePath>,
) -> ApiResult<web::Json<NoteResponse>> {
    let id = note_id(&path.id)?;
    let note = state.notes.get(caller.claims(), &id).await?;
    Ok(web::Json(note.into()))
}

/// Patch a note. Only its author or an admin may.
#[utoipa::path(
    put,
    path = "/api/v1/notes/{id}",
    params(("id" = String, Path, description = "Note identifier")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Updated", body = NoteResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Note not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "updateNote",
    security(("BearerAuth" = []))
)]
#[put("/notes/{id}")]
pub async fn update_note(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<NotePath>,
    payload: web::Json<UpdateNoteRequest>,
) -> ApiResult<web::Json<NoteResponse>> {
    let id = note_id(&path.id)?;
    let patch = NotePatch::try_from(payload.into_inner())?;
    let note = state.notes.update(caller.claims(), &id, patch).await?;
    Ok(web::Json(note.into()))
}

/// Delete a note. Only its author or an admin may.
#[utoipa::path(
    delete,
    path = "/api/v1/notes/{id}",
    params(("id" = String, Path, description = "Note identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Note not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "deleteNote",
    security(("BearerAuth" = []))
)]
#[delete("/notes/{id}")]
pub async fn delete_note(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<NotePath>,
) -> ApiResult<HttpResponse> {
    let id = note_id(&path.id)?;
    state.notes.delete(caller.claims(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Attach a previously uploaded file.
#[utoipa::path(
    post,
    path = "/api/v1/notes/{id}/attachments",
    params(("id" = String, Path, description = "Note identifier")),
    request_body = AddAttachmentRequest,
    responses(
        (status = 200, description = "Attached", body = NoteResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Note or file not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "addAttachment",
    security(("BearerAuth" = []))
)]
#[post("/notes/{id}/attachments")]
pub async fn add_attachment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<NotePath>,
    payload: web::Json<AddAttachmentRequest>,
) -> ApiResult<web::Json<NoteResponse>> {
    let id = note_id(&path.id)?;
    let draft = AttachmentDraft::try_from(payload.into_inner())?;
    let note = state
        .notes
        .add_attachment(caller.claims(), &id, draft)
        .await?;
    Ok(web::Json(note.into()))
}

/// Store the request body and attach it.
#[utoipa::path(
    post,
    path = "/api/v1/notes/{id}/attachments/upload",
    params(
        ("id" = String, Path, description = "Note identifier"),
        ("filename" = Option<String>, Query, description = "Original file name")
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Stored and attached", body = NoteResponse),
        (status = 400, description = "Empty body or bad content type", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Note not found", body = ErrorSchema),
        (status = 413, description = "Body too large")
    ),
    tags = ["notes"],
    operation_id = "uploadAttachment",
    security(("BearerAuth" = []))
)]
#[post("/notes/{id}/attachments/upload")]
pub async fn upload_attachment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<NotePath>,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ApiResult<web::Json<NoteResponse>> {
    let id = note_id(&path.id)?;
    let upload = blob_upload(&req, query.into_inner().filename, body)?;
    let note = state
        .notes
        .upload_attachment(caller.claims(), &id, upload)
        .await?;
    Ok(web::Json(note.into()))
}

/// Detach a file. The stored blob is kept.
#[utoipa::path(
    delete,
    path = "/api/v1/notes/{id}/attachments/{attachment_id}",
    params(
        ("id" = String, Path, description = "Note identifier"),
        ("attachment_id" = String, Path, description = "Attachment identifier")
    ),
    responses(
        (status = 200, description = "Detached", body = NoteResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Note or attachment not found", body = ErrorSchema)
    ),
    tags = ["notes"],
    operation_id = "removeAttachment",
    security(("BearerAuth" = []))
)]
#[delete("/notes/{id}/attachments/{attachment_id}")]
pub async fn remove_attachment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<AttachmentPath>,
) -> ApiResult<web::Json<NoteResponse>> {
    let id = note_id(&path.id)?;
    let attachment: AttachmentId = parse_id(&path.attachment_id, FieldName::new("attachmentId"))?;
    let note = state
        .notes
        .remove_attachment(caller.claims(), &id, &attachment)
        .await?;
    Ok(web::Json(note.into()))
}
