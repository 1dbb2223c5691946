//! Server construction and middleware wiring.

mod config;
mod settings;
pub mod state_builders;

pub use config::{DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};
pub use settings::{AppSettings, BindAddrError};

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{Condition, from_fn};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::api_scope;
use crate::inbound::http::error::expose_internal_details;
use crate::inbound::http::health::{HealthState, Milestone, live, ready};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;

/// Everything a worker needs to build its [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub expose_error_details: bool,
    pub max_upload_bytes: usize,
}

/// Build the application: `/api/v1` routes, health probes and, in debug
/// builds, Swagger UI at `/docs`.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        expose_error_details,
        max_upload_bytes,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Condition::new(
            expose_error_details,
            from_fn(expose_internal_details),
        ))
        .wrap(Trace)
        .service(api_scope(max_upload_bytes))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app
}

/// Bind the listener and start serving.
///
/// The [`Milestone::Listener`] milestone is recorded once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        expose_error_details: config.expose_error_details(),
        max_upload_bytes: config.max_upload_bytes(),
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr())?
        .run();

    health_state.reach(Milestone::Listener);
    Ok(server)
}
