//! Authentication primitives: credentials, passwords, claims and tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use zeroize::Zeroizing;

use super::{EmailAddress, ProfilePatch, Role, UserId, Username};

/// Lifetime of an issued bearer token.
pub const TOKEN_TTL: Duration = Duration::hours(1);

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by the credential service.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use taskboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "pw123456").unwrap();
/// assert_eq!(creds.username(), "alice");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raised when a new password is too short.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password must be at least {PASSWORD_MIN} characters")]
pub struct WeakPassword;

/// Plaintext password chosen by a user, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a new password.
    pub fn new(raw: impl Into<String>) -> Result<Self, WeakPassword> {
        let raw = Zeroizing::new(raw.into());
        if raw.chars().count() < PASSWORD_MIN {
            return Err(WeakPassword);
        }
        Ok(Self(raw))
    }

    /// Borrow the plaintext.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Account details supplied at self-registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
    pub profile: ProfilePatch,
}

/// Verified identity carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Claims for a token issued at `now` with the standard lifetime.
    pub fn issue(user_id: UserId, username: impl Into<String>, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            issued_at: now,
            expires_at: now + TOKEN_TTL,
        }
    }

    /// Whether the caller holds the global admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Signed token handed to a client after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = LoginCredentials::try_from_parts("alice", "hunter22").expect("valid");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter22"));
    }

    #[rstest]
    #[case("short", false)]
    #[case("pw123456", true)]
    fn password_length_policy(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(Password::new(raw).is_ok(), ok);
    }

    #[test]
    fn claims_expire_after_one_hour() {
        let now = Utc::now();
        let claims = Claims::issue(UserId::random(), "alice", Role::User, now);
        assert_eq!(claims.expires_at - claims.issued_at, Duration::hours(1));
        assert!(!claims.is_admin());
    }
}
