//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Scope, web};

use crate::domain::Claims;
use crate::domain::ports::{
    MockAccountService, MockGroupDirectory, MockLoginService, MockMediaLibrary, MockNoteStore,
    MockProjectDirectory, MockTokenValidator, MockUserAdministration,
};
use crate::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::inbound::http::state::HttpState;

/// Bearer token accepted by [`accepting`].
pub const TOKEN: &str = "test-token";

/// Mocked driving ports; set expectations on the fields you need.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub tokens: MockTokenValidator,
    pub accounts: MockAccountService,
    pub admin: MockUserAdministration,
    pub groups: MockGroupDirectory,
    pub projects: MockProjectDirectory,
    pub notes: MockNoteStore,
    pub media: MockMediaLibrary,
}

impl MockPorts {
    /// Ports whose token validator maps [`TOKEN`] to `claims`.
    pub fn signed_in(claims: Claims) -> Self {
        Self {
            tokens: accepting(claims),
            ..Self::default()
        }
    }

    pub fn into_state(self) -> HttpState {
        HttpState {
            login: Arc::new(self.login),
            tokens: Arc::new(self.tokens),
            accounts: Arc::new(self.accounts),
            admin: Arc::new(self.admin),
            groups: Arc::new(self.groups),
            projects: Arc::new(self.projects),
            notes: Arc::new(self.notes),
            media: Arc::new(self.media),
        }
    }
}

/// State whose only configured port is the token validator.
pub fn state_with_tokens(tokens: MockTokenValidator) -> HttpState {
    MockPorts {
        tokens,
        ..MockPorts::default()
    }
    .into_state()
}

/// Token validator that accepts [`TOKEN`] as `claims` and rejects anything else.
pub fn accepting(claims: Claims) -> MockTokenValidator {
    let mut tokens = MockTokenValidator::new();
    tokens.expect_validate().returning(move |token| {
        if token == TOKEN {
            Ok(claims.clone())
        } else {
            Err(crate::domain::Error::unauthorized("invalid token"))
        }
    });
    tokens
}

/// `Authorization` header carrying [`TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TOKEN}"))
}

/// App mounting `scope` under `/api/v1` with the production extractor
/// configuration.
pub fn test_app(
    state: HttpState,
    scope: impl FnOnce(Scope) -> Scope,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(state)).service(scope(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler)),
    ))
}
