//! In-process repositories used when no database is configured, and by the
//! HTTP and integration tests.
//!
//! Each store keeps its aggregates behind a `tokio::sync::RwLock` and honours
//! the same uniqueness and atomic-membership contracts as the PostgreSQL
//! adapters.

mod groups;
mod notes;
mod projects;
mod users;

pub use groups::InMemoryGroupRepository;
pub use notes::InMemoryNoteRepository;
pub use projects::InMemoryProjectRepository;
pub use users::InMemoryUserRepository;
