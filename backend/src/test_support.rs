//! In-memory backend for integration tests.
//!
//! Compiled for unit tests and behind the `test-support` feature so the
//! integration suites in `tests/` can drive the real actix app without a
//! database or filesystem.

use std::sync::Arc;

use actix_web::web;
use argon2::Params;
use mockable::{Clock, DefaultClock};
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHasher, UserRepository};
use crate::domain::{
    EmailAddress, Error, Password, Role, User, UserId, UserProfile, UserStatus, Username,
};
use crate::inbound::http::health::{HealthState, Milestone};
use crate::inbound::http::state::HttpState;
use crate::outbound::blob::InMemoryBlobStore;
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};
use crate::server::state_builders::{Collaborators, InMemoryRepositories, assemble};
use crate::server::{AppDependencies, DEFAULT_MAX_UPLOAD_BYTES};

/// Password given to every user created by [`TestBackend::seed_user`].
pub const SEED_PASSWORD: &str = "correct-horse-battery";

/// A fully wired backend over in-memory adapters.
pub struct TestBackend {
    repos: InMemoryRepositories,
    hasher: Arc<Argon2PasswordHasher>,
    clock: Arc<dyn Clock>,
    state: HttpState,
    health: web::Data<HealthState>,
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBackend {
    /// Build a backend with cheap Argon2 parameters and every health
    /// milestone reached.
    #[must_use]
    pub fn new() -> Self {
        let repos = InMemoryRepositories::in_memory();
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let hasher = Arc::new(Argon2PasswordHasher::with_params(cheap_params()));
        let state = assemble(
            repos.clone(),
            Collaborators {
                blobs: Arc::new(InMemoryBlobStore::new(Arc::clone(&clock))),
                hasher: Arc::clone(&hasher),
                codec: Arc::new(JwtTokenCodec::new(&Zeroizing::new(vec![42_u8; 32]))),
                clock: Arc::clone(&clock),
            },
        );
        let health = web::Data::new(HealthState::new());
        for milestone in [Milestone::Storage, Milestone::BlobStore, Milestone::Listener] {
            health.reach(milestone);
        }
        Self {
            repos,
            hasher,
            clock,
            state,
            health,
        }
    }

    /// Dependencies for [`crate::server::build_app`].
    #[must_use]
    pub fn app_dependencies(&self) -> AppDependencies {
        AppDependencies {
            health_state: self.health.clone(),
            http_state: web::Data::new(self.state.clone()),
            expose_error_details: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// The assembled port bundle.
    #[must_use]
    pub fn state(&self) -> &HttpState {
        &self.state
    }

    /// Insert an active user directly into the repository.
    ///
    /// Registration always yields the `user` role, so admins for a scenario
    /// are created here. The password is [`SEED_PASSWORD`].
    ///
    /// # Errors
    /// Returns [`Error`] when the name is not a valid username or the
    /// repository rejects the insert.
    pub async fn seed_user(&self, username: &str, role: Role) -> Result<User, Error> {
        let password =
            Password::new(SEED_PASSWORD).map_err(|err| Error::internal(err.to_string()))?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            username: Username::new(username)
                .map_err(|err| Error::invalid_request(err.to_string()))?,
            email: EmailAddress::new(format!("{username}@example.com"))
                .map_err(|err| Error::invalid_request(err.to_string()))?,
            password_hash: self
                .hasher
                .hash(&password)
                .map_err(|err| Error::internal(err.to_string()))?,
            role,
            status: UserStatus::Active,
            profile: UserProfile::default(),
            image_id: None,
            joined_at: now,
            updated_at: now,
        };
        self.repos
            .users
            .insert(&user)
            .await
            .map_err(|err| Error::internal(err.to_string()))?;
        Ok(user)
    }
}

fn cheap_params() -> Params {
    Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
        .unwrap_or_default()
}
