//! User accounts: identity, global role and profile.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::wire_enum;
use super::{BlobId, UserId};

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

/// Validation errors raised by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("username must be between {USERNAME_MIN} and {USERNAME_MAX} characters")]
    UsernameLength,
    #[error("username may only contain letters, numbers, '.', '-' or '_'")]
    UsernameCharacters,
    #[error("email address is not valid")]
    InvalidEmail,
}

/// Unique login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use taskboard::domain::Username;
    ///
    /// assert!(Username::new("alice").is_ok());
    /// assert!(Username::new("a b").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let length = raw.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength);
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(UserValidationError::UsernameCharacters);
        }
        Ok(Self(raw))
    }

    /// Borrow the username text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// The check is structural only: a non-empty local part and a dotted
    /// domain with no empty labels.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
        if local.is_empty() || !domain_ok || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

wire_enum! {
    /// Platform-wide role of a user.
    ///
    /// The set is closed; what each role may do is looked up in
    /// [`crate::domain::access::capabilities`].
    pub enum Role("role") {
        User => "user",
        Admin => "admin",
        TeamLead => "team-lead",
        ProjectManager => "project-manager",
        BackendDev => "backend-dev",
        FrontendDev => "frontend-dev",
        FullstackDev => "fullstack-dev",
        Designer => "designer",
        QaEngineer => "qa-engineer",
        DevopsEngineer => "devops-engineer",
        DataScientist => "data-scientist",
        ProductOwner => "product-owner",
    }
}

wire_enum! {
    /// Employment status of a user account.
    pub enum UserStatus("user status") {
        Active => "active",
        Inactive => "inactive",
        OnLeave => "on-leave",
    }
}

/// Opaque password hash in PHC string format.
///
/// `Debug` never prints the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string produced by a [`crate::domain::ports::PasswordHasher`].
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Borrow the PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Free-form profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Partial update of [`UserProfile`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub skills: Option<Vec<String>>,
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfilePatch {
    /// Apply the patch to `profile`.
    pub fn apply(self, profile: &mut UserProfile) {
        let Self {
            first_name,
            last_name,
            phone_number,
            position,
            department,
            skills,
            date_of_birth,
        } = self;
        if let Some(value) = first_name {
            profile.first_name = Some(value);
        }
        if let Some(value) = last_name {
            profile.last_name = Some(value);
        }
        if let Some(value) = phone_number {
            profile.phone_number = Some(value);
        }
        if let Some(value) = position {
            profile.position = Some(value);
        }
        if let Some(value) = department {
            profile.department = Some(value);
        }
        if let Some(value) = skills {
            profile.skills = value;
        }
        if let Some(value) = date_of_birth {
            profile.date_of_birth = Some(value);
        }
    }
}

/// Application user.
///
/// ## Invariants
/// - `username` and `email` are unique across all users (enforced by the
///   repository).
/// - `password_hash` never leaves the domain; response types omit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub status: UserStatus,
    pub profile: UserProfile,
    pub image_id: Option<BlobId>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user holds the global admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields a user may change on their own record.
///
/// Role and status are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct SelfProfileUpdate {
    pub profile: ProfilePatch,
    pub email: Option<EmailAddress>,
    pub password: Option<super::Password>,
    pub image_id: Option<BlobId>,
}

/// Fields an administrator may change on any editable record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminUserPatch {
    pub profile: ProfilePatch,
    pub email: Option<EmailAddress>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}
