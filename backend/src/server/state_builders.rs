//! Builders wiring repositories, the blob store and credential adapters into
//! the driving ports held by [`HttpState`].

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountService, BlobStore, GroupRepository, LoginService, NoteRepository, PasswordHasher,
    ProjectRepository, TokenCodec, TokenValidator, UserAdministration, UserRepository,
};
use crate::domain::{
    AccountManager, CredentialService, GroupDirectoryService, MediaService, NoteStoreService,
    ProjectDirectoryService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{
    InMemoryGroupRepository, InMemoryNoteRepository, InMemoryProjectRepository,
    InMemoryUserRepository,
};
use crate::outbound::persistence::{
    DbPool, DieselGroupRepository, DieselNoteRepository, DieselProjectRepository,
    DieselUserRepository,
};

/// Driven adapters shared by every service.
pub struct Repositories<U, G, P, N> {
    pub users: Arc<U>,
    pub groups: Arc<G>,
    pub projects: Arc<P>,
    pub notes: Arc<N>,
}

impl<U, G, P, N> Clone for Repositories<U, G, P, N> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            groups: Arc::clone(&self.groups),
            projects: Arc::clone(&self.projects),
            notes: Arc::clone(&self.notes),
        }
    }
}

/// In-process repositories for database-less runs and tests.
pub type InMemoryRepositories = Repositories<
    InMemoryUserRepository,
    InMemoryGroupRepository,
    InMemoryProjectRepository,
    InMemoryNoteRepository,
>;

/// PostgreSQL repositories sharing one pool.
pub type DieselRepositories = Repositories<
    DieselUserRepository,
    DieselGroupRepository,
    DieselProjectRepository,
    DieselNoteRepository,
>;

impl InMemoryRepositories {
    /// Fresh, empty in-memory stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            groups: Arc::new(InMemoryGroupRepository::new()),
            projects: Arc::new(InMemoryProjectRepository::new()),
            notes: Arc::new(InMemoryNoteRepository::new()),
        }
    }
}

impl DieselRepositories {
    /// PostgreSQL repositories sharing `pool`.
    #[must_use]
    pub fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            groups: Arc::new(DieselGroupRepository::new(pool.clone())),
            projects: Arc::new(DieselProjectRepository::new(pool.clone())),
            notes: Arc::new(DieselNoteRepository::new(pool.clone())),
        }
    }
}

/// Credential adapters and the clock used for timestamps and token expiry.
pub struct Collaborators<B, H, T> {
    pub blobs: Arc<B>,
    pub hasher: Arc<H>,
    pub codec: Arc<T>,
    pub clock: Arc<dyn Clock>,
}

/// Build every driving port over the given adapters.
///
/// Credential and account services each back two ports; one instance is
/// shared between them.
pub fn assemble<U, G, P, N, B, H, T>(
    repos: Repositories<U, G, P, N>,
    collaborators: Collaborators<B, H, T>,
) -> HttpState
where
    U: UserRepository + 'static,
    G: GroupRepository + 'static,
    P: ProjectRepository + 'static,
    N: NoteRepository + 'static,
    B: BlobStore + 'static,
    H: PasswordHasher + 'static,
    T: TokenCodec + 'static,
{
    let Repositories {
        users,
        groups,
        projects,
        notes,
    } = repos;
    let Collaborators {
        blobs,
        hasher,
        codec,
        clock,
    } = collaborators;

    let credentials = Arc::new(CredentialService::new(
        Arc::clone(&users),
        Arc::clone(&hasher),
        codec,
        Arc::clone(&clock),
    ));
    let accounts = Arc::new(AccountManager::new(
        Arc::clone(&users),
        hasher,
        Arc::clone(&blobs),
        Arc::clone(&clock),
    ));
    let group_directory = Arc::new(GroupDirectoryService::new(
        Arc::clone(&groups),
        Arc::clone(&users),
        Arc::clone(&clock),
    ));
    let project_directory = Arc::new(ProjectDirectoryService::new(
        Arc::clone(&projects),
        groups,
        users,
        Arc::clone(&clock),
    ));
    let note_store = Arc::new(NoteStoreService::new(
        notes,
        projects,
        Arc::clone(&blobs),
        clock,
    ));

    HttpState {
        login: Arc::clone(&credentials) as Arc<dyn LoginService>,
        tokens: credentials as Arc<dyn TokenValidator>,
        accounts: Arc::clone(&accounts) as Arc<dyn AccountService>,
        admin: accounts as Arc<dyn UserAdministration>,
        groups: group_directory,
        projects: project_directory,
        notes: note_store,
        media: Arc::new(MediaService::new(blobs)),
    }
}
