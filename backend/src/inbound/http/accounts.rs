//! Account, login and file handlers under `/auth`.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"alice","email":"a@x.com","password":"pw123456"}
//! POST /api/v1/auth/login {"username":"alice","password":"pw123456"}
//! GET /api/v1/auth/user
//! PUT /api/v1/auth/user/update {"department":"Platform"}
//! PUT /api/v1/auth/user/image <raw bytes>
//! GET /api/v1/auth/users
//! POST /api/v1/auth/upload?filename=logo.png <raw bytes>
//! GET /api/v1/auth/images/{id}
//! ```

use actix_web::http::header::{self, EntityTag, IfNoneMatch};
use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{
    BlobId, BlobUpload, BlobValidationError, Error, LoginCredentials, LoginValidationError,
    Registration, SelfProfileUpdate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users_dto::{
    LoginRequest, LoginResponse, RegisterRequest, SelfUpdateRequest, UploadQuery,
    UploadResponse, UserResponse,
};
use crate::inbound::http::validation::{FieldName, parse_id};

const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Debug, Deserialize)]
struct ImagePath {
    id: String,
}

/// Build a [`BlobUpload`] from a raw request body and its `Content-Type`.
pub(crate) fn blob_upload(
    req: &HttpRequest,
    filename: Option<String>,
    body: web::Bytes,
) -> Result<BlobUpload, Error> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    BlobUpload::new(filename, content_type, body.to_vec()).map_err(map_blob_validation_error)
}

fn map_blob_validation_error(err: BlobValidationError) -> Error {
    let code = match err {
        BlobValidationError::Empty => "empty_body",
        BlobValidationError::InvalidContentType(_) => "invalid_content_type",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "code": code }))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Register a new account. Role is always `user`.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username or email taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&username, &password)
        .map_err(map_login_validation_error)?;
    let issued = state.login.authenticate(&credentials).await?;
    Ok(web::Json(LoginResponse::from(issued)))
}

/// Return the caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/auth/user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("BearerAuth" = []))
)]
#[get("/auth/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.accounts.current_user(caller.claims()).await?;
    Ok(web::Json(user.into()))
}

/// Update the caller's own profile, email, password or image reference.
#[utoipa::path(
    put,
    path = "/api/v1/auth/user/update",
    request_body = SelfUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Referenced image not found", body = ErrorSchema),
        (status = 409, description = "Email taken", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "updateCurrentUser",
    security(("BearerAuth" = []))
)]
#[put("/auth/user/update")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<SelfUpdateRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let update = SelfProfileUpdate::try_from(payload.into_inner())?;
    let user = state.accounts.update_profile(caller.claims(), update).await?;
    Ok(web::Json(user.into()))
}

/// Replace the caller's profile image with the request body.
#[utoipa::path(
    put,
    path = "/api/v1/auth/user/image",
    params(("filename" = Option<String>, Query, description = "Original file name")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Empty body or bad content type", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 413, description = "Body too large")
    ),
    tags = ["auth"],
    operation_id = "replaceProfileImage",
    security(("BearerAuth" = []))
)]
#[put("/auth/user/image")]
pub async fn replace_profile_image(
    state: web::Data<HttpState>,
    caller: Caller,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ApiResult<web::Json<UserResponse>> {
    let image = blob_upload(&req, query.into_inner().filename, body)?;
    let user = state
        .accounts
        .replace_profile_image(caller.claims(), image)
        .await?;
    Ok(web::Json(user.into()))
}

/// List every user. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/auth/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "listUsers",
    security(("BearerAuth" = []))
)]
#[get("/auth/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.admin.list_users(caller.claims()).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Store the request body as a blob.
#[utoipa::path(
    post,
    path = "/api/v1/auth/upload",
    params(("filename" = Option<String>, Query, description = "Original file name")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 400, description = "Empty body or bad content type", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 413, description = "Body too large")
    ),
    tags = ["auth"],
    operation_id = "uploadFile",
    security(("BearerAuth" = []))
)]
#[post("/auth/upload")]
pub async fn upload(
    state: web::Data<HttpState>,
    caller: Caller,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let file = blob_upload(&req, query.into_inner().filename, body)?;
    let metadata = state.media.upload(caller.claims(), file).await?;
    Ok(HttpResponse::Created().json(UploadResponse::from(metadata)))
}

/// Stream a stored blob. Not authenticated.
#[utoipa::path(
    get,
    path = "/api/v1/auth/images/{id}",
    params(("id" = String, Path, description = "Blob identifier")),
    responses(
        (status = 200, description = "Blob content", content_type = "application/octet-stream", body = Vec<u8>,
            headers(("ETag" = String), ("Cache-Control" = String))),
        (status = 304, description = "Client copy is current"),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "File not found", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "getImage",
    security([])
)]
#[get("/auth/images/{id}")]
pub async fn get_image(
    state: web::Data<HttpState>,
    path: web::Path<ImagePath>,
    if_none_match: Option<web::Header<IfNoneMatch>>,
) -> ApiResult<HttpResponse> {
    let id: BlobId = parse_id(&path.id, FieldName::new("id"))?;
    let blob = state.media.fetch(&id).await?;
    let etag = EntityTag::new_strong(blob.metadata.sha256.clone());

    let fresh = match if_none_match.as_deref() {
        Some(IfNoneMatch::Any) => true,
        Some(IfNoneMatch::Items(tags)) => tags.iter().any(|tag| tag.weak_eq(&etag)),
        None => false,
    };
    let mut response = if fresh {
        HttpResponse::NotModified()
    } else {
        HttpResponse::Ok()
    };
    response
        .insert_header(header::ETag(etag))
        .insert_header((header::CACHE_CONTROL, IMAGE_CACHE_CONTROL));
    if fresh {
        return Ok(response.finish());
    }
    Ok(response
        .content_type(blob.metadata.content_type)
        .body(blob.bytes))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
