//! Port abstraction for signing and verifying bearer tokens.
use crate::domain::Claims;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codecs.
    pub enum TokenError {
        /// Signature, structure or claim content is invalid.
        Invalid { message: String } => "token is invalid: {message}",
        /// Signing failed.
        Encoding { message: String } => "token encoding failed: {message}",
    }
}

/// Signs claims into an opaque token and verifies them back.
///
/// Codecs verify signatures and structure only; expiry is judged by the
/// caller against its own clock.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign `claims`.
    fn encode(&self, claims: &Claims) -> Result<String, TokenError>;

    /// Verify `token` and return its claims.
    fn decode(&self, token: &str) -> Result<Claims, TokenError>;
}
