//! Liveness and readiness probes.
//!
//! Readiness is the conjunction of three start-up milestones: storage
//! initialised (migrations applied or in-memory repositories built), blob
//! store opened and listener bound. Liveness flips to false once shutdown
//! begins so orchestrators stop routing before the drain completes.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};

/// Start-up milestones gating readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Storage,
    BlobStore,
    Listener,
}

impl Milestone {
    const ALL: [Self; 3] = [Self::Storage, Self::BlobStore, Self::Listener];

    fn bit(self) -> u8 {
        match self {
            Self::Storage => 0b001,
            Self::BlobStore => 0b010,
            Self::Listener => 0b100,
        }
    }
}

/// Shared probe state.
#[derive(Debug)]
pub struct HealthState {
    reached: AtomicU8,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            reached: AtomicU8::new(0),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Not ready, alive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `milestone` has been reached.
    pub fn reach(&self, milestone: Milestone) {
        self.reached.fetch_or(milestone.bit(), Ordering::AcqRel);
    }

    /// Whether every milestone has been reached.
    pub fn is_ready(&self) -> bool {
        let reached = self.reached.load(Ordering::Acquire);
        Milestone::ALL.iter().all(|m| reached & m.bit() != 0)
    }

    /// Fail liveness from now on.
    pub fn mark_draining(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Whether the process is still accepting work.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

fn probe_response(ok: bool) -> HttpResponse {
    let mut response = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Storage, blob store and listener are up"),
        (status = 503, description = "Still starting")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_ready())
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive"),
        (status = 503, description = "Shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_response(state.is_alive())
}
