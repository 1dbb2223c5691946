//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::middleware::from_fn;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde::Deserialize;
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error() -> Error {
    Error::internal("pool exhausted")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"secret": "x"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn rendered(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("error JSON deserialises");
    (status, header, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error: Error) {
    let (status, header, payload) = rendered(&internal_error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert!(payload.details().is_none());
}

#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::conflict("username already taken")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"field": "username"}));

    let (status, header, payload) = rendered(&error).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "username already taken");
    assert_eq!(payload.details(), Some(&json!({"field": "username"})));
}

#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let (_, header, payload) = rendered(&Error::not_found("group not found")).await;
    assert!(header.is_none());
    assert_eq!(payload.trace_id(), None);
}

async fn failing() -> ApiResult<HttpResponse> {
    Err(Error::internal("pool exhausted").with_details(json!({"pool": "primary"})))
}

#[actix_web::test]
async fn exposing_middleware_restores_internal_payload() {
    let app = actix_test::init_service(
        App::new()
            .wrap(from_fn(expose_internal_details))
            .route("/", web::get().to(failing)),
    )
    .await;

    let res =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Error = actix_test::read_body_json(res).await;
    assert_eq!(body.message(), "pool exhausted");
    assert_eq!(body.details(), Some(&json!({"pool": "primary"})));
}

#[actix_web::test]
async fn without_middleware_internal_payload_stays_redacted() {
    let app = actix_test::init_service(App::new().route("/", web::get().to(failing))).await;

    let res =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
    let body: Error = actix_test::read_body_json(res).await;
    assert_eq!(body.message(), "Internal server error");
    assert!(body.details().is_none());
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Payload {
    #[expect(dead_code, reason = "only deserialisation is exercised")]
    name: String,
}

async fn accept(_: web::Json<Payload>) -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn accept_id(_: web::Path<uuid::Uuid>) -> HttpResponse {
    HttpResponse::Ok().finish()
}

#[rstest]
#[case(r#"{"name": 1}"#)]
#[case(r#"{"name": "x", "role": "admin"}"#)]
#[case("not json")]
#[actix_web::test]
async fn malformed_json_is_a_bad_request_with_reason(#[case] body: &'static str) {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/", web::post().to(accept)),
    )
    .await;

    let req = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert!(payload.details().and_then(|d| d.get("reason")).is_some());
}

#[actix_web::test]
async fn malformed_path_uuid_is_a_bad_request() {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .route("/things/{id}", web::get().to(accept_id)),
    )
    .await;

    let req = actix_test::TestRequest::get().uri("/things/not-a-uuid").to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.message(), "path parameter is not a valid identifier");
}
