//! Port abstraction for one-way password hashing.
use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hash computation failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        Malformed { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Salted, slow password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a new password with a fresh salt.
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;

    /// Check `candidate` against `hash`. A mismatch is `Ok(false)`.
    fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}
