//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: in-process repositories for tests and database-less runs
//! - **blob**: filesystem and in-memory blob stores
//! - **security**: Argon2id password hashing and JWT bearer tokens
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod blob;
pub mod memory;
pub mod persistence;
pub mod security;
