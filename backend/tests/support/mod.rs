//! Shared helpers driving the in-memory app through `actix_web::test`.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{Method, StatusCode, header};
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};
use taskboard::domain::{Role, User};
use taskboard::server::build_app;
use taskboard::test_support::{SEED_PASSWORD, TestBackend};

/// Start the full application over `backend`.
pub async fn start(
    backend: &TestBackend,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(build_app(backend.app_dependencies())).await
}

/// Send a JSON request under `/api/v1` and decode the body (`Null` when
/// empty).
pub async fn call<B: MessageBody>(
    app: &impl Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = TestRequest::default()
        .method(method)
        .uri(&format!("/api/v1{path}"));
    if let Some(token) = token {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    if let Some(body) = body {
        req = req.set_json(body);
    }
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let decoded = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, decoded)
}

/// Log in with `password` and return the bearer token.
pub async fn login_with<B: MessageBody>(
    app: &impl Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login for {username} failed: {body}");
    body["token"].as_str().expect("token").to_owned()
}

/// Seed a user with [`SEED_PASSWORD`] and log them in.
pub async fn seed_and_login<B: MessageBody>(
    backend: &TestBackend,
    app: &impl Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    username: &str,
    role: Role,
) -> (User, String) {
    let user = backend.seed_user(username, role).await.expect("seed user");
    let token = login_with(app, username, SEED_PASSWORD).await;
    (user, token)
}

/// Values of `field` across a JSON array body.
pub fn field_values(body: &Value, field: &str) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .filter_map(|item| item[field].as_str())
        .map(str::to_owned)
        .collect()
}
