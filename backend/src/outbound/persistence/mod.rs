//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between the row structs in `models.rs` and domain
//! aggregates; no business rules live here. Connections come from a shared
//! `bb8` pool driven by `diesel-async`. Membership, sprint and attachment
//! writes run in a transaction holding a row lock so their preconditions are
//! checked against committed state.

mod diesel_basic_error_mapping;
mod diesel_group_repository;
mod diesel_note_repository;
mod diesel_project_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_note_repository::DieselNoteRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolError, PoolLimits};
