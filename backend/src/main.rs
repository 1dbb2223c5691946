//! Backend entry-point: loads settings, selects adapters and runs the listener.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use taskboard::inbound::http::health::{HealthState, Milestone};
use taskboard::inbound::http::state::HttpState;
use taskboard::inbound::http::token_config::{BuildMode, token_settings_from_env};
use taskboard::outbound::blob::FsBlobStore;
use taskboard::outbound::persistence::{DbPool, PoolLimits, run_migrations};
use taskboard::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};
use taskboard::server::state_builders::{
    Collaborators, DieselRepositories, InMemoryRepositories, assemble,
};
use taskboard::server::{AppSettings, create_server};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| io::Error::other(err.to_string()))?;
    let config = settings.server_config().map_err(io::Error::other)?;
    let health_state = web::Data::new(HealthState::new());

    let tokens = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let blobs = FsBlobStore::open(settings.blob_dir(), Arc::clone(&clock))
        .await
        .map_err(io::Error::other)?;
    health_state.reach(Milestone::BlobStore);

    let collaborators = Collaborators {
        blobs: Arc::new(blobs),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        codec: Arc::new(JwtTokenCodec::new(&tokens.secret)),
        clock,
    };
    let http_state = build_state(
        settings.database_url.as_deref(),
        settings.pool_limits(),
        collaborators,
    )
    .await?;
    health_state.reach(Milestone::Storage);

    let server = create_server(health_state.clone(), http_state, &config)?;
    info!(addr = %config.bind_addr(), "listening");

    let handle = server.handle();
    let draining = health_state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            draining.mark_draining();
            handle.stop(true).await;
        }
    });

    server.await
}

async fn build_state(
    database_url: Option<&str>,
    limits: PoolLimits,
    collaborators: Collaborators<FsBlobStore, Argon2PasswordHasher, JwtTokenCodec>,
) -> io::Result<HttpState> {
    let Some(url) = database_url else {
        warn!("no database URL configured; data is kept in memory and lost on exit");
        return Ok(assemble(InMemoryRepositories::in_memory(), collaborators));
    };
    run_migrations(url).await.map_err(io::Error::other)?;
    let pool = DbPool::connect(url, limits)
        .await
        .map_err(io::Error::other)?;
    Ok(assemble(DieselRepositories::diesel(&pool), collaborators))
}
