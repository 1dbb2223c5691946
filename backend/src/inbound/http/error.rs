//! HTTP adapter mapping for domain errors.
//!
//! Handlers return [`ApiResult`]; failures render as `{code, message,
//! traceId?, details?}` with a status derived from the error code. Internal
//! errors are logged with their cause and redacted on the wire. Development
//! deployments wrap the API in [`expose_internal_details`] to restore the
//! original payload.

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::middleware::Next;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE).without_details();
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            error!(
                message = self.message(),
                trace_id = self.trace_id(),
                details = ?self.details(),
                "request failed with internal error"
            );
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

/// Middleware restoring the unredacted body of internal errors.
///
/// Mounted only when the server runs with `expose_error_details`.
pub async fn expose_internal_details(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let res = next.call(req).await?;
    let original = res
        .response()
        .error()
        .and_then(|err| err.as_error::<Error>())
        .filter(|err| err.code() == ErrorCode::InternalError)
        .cloned();
    let Some(original) = original else {
        return Ok(res.map_into_boxed_body());
    };
    let body = serde_json::to_vec(&original).map_err(actix_web::error::ErrorInternalServerError)?;
    Ok(res.map_body(|_, _| BoxBody::new(body)))
}

/// Render malformed JSON bodies as `invalid_request` with the parser message.
///
/// Oversized bodies keep actix's own `413 Payload Too Large`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            err.into()
        }
        other => Error::invalid_request("request body is not valid JSON")
            .with_details(json!({ "reason": other.to_string() }))
            .into(),
    }
}

/// Render undecodable path segments (for example malformed UUIDs) as 400.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("path parameter is not a valid identifier")
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

/// Render undecodable query strings as 400.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("query string is not valid")
        .with_details(json!({ "reason": err.to_string() }))
        .into()
}

#[cfg(test)]
mod tests;
