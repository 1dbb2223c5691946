//! User-facing DTOs shared by the account and admin handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AdminUserPatch, BlobMetadata, EmailAddress, Error, IssuedToken, Password, ProfilePatch,
    Registration, SelfProfileUpdate, User, Username,
};
use crate::inbound::http::validation::{
    FieldName, invalid_field, parse_optional_date, parse_optional_enum,
    parse_optional_id, require,
};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

/// Profile fields accepted by every user-editing request.
struct ProfileFields {
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    position: Option<String>,
    department: Option<String>,
    skills: Option<Vec<String>>,
    date_of_birth: Option<String>,
}

impl ProfileFields {
    fn into_patch(self) -> Result<ProfilePatch, Error> {
        Ok(ProfilePatch {
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
            position: self.position,
            department: self.department,
            skills: self.skills,
            date_of_birth: parse_optional_date(
                self.date_of_birth.as_deref(),
                FieldName::new("dateOfBirth"),
            )?,
        })
    }
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| invalid_field(EMAIL, err))
}

fn parse_password(raw: String) -> Result<Password, Error> {
    Password::new(raw).map_err(|err| invalid_field(PASSWORD, err))
}

/// Request body for `POST /api/v1/auth/register`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub skills: Option<Vec<String>>,
    #[schema(example = "1990-04-01")]
    pub date_of_birth: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let username = require(value.username, USERNAME)?;
        let email = require(value.email, EMAIL)?;
        let password = require(value.password, PASSWORD)?;
        Ok(Self {
            username: Username::new(username).map_err(|err| invalid_field(USERNAME, err))?,
            email: parse_email(&email)?,
            password: parse_password(password)?,
            profile: ProfileFields {
                first_name: value.first_name,
                last_name: value.last_name,
                phone_number: value.phone_number,
                position: value.position,
                department: value.department,
                skills: value.skills,
                date_of_birth: value.date_of_birth,
            }
            .into_patch()?,
        })
    }
}

/// Request body for `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    pub token: String,
    pub expires_at: String,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            message: "Login successful".to_owned(),
            expires_at: issued.claims.expires_at.to_rfc3339(),
            token: issued.token,
        }
    }
}

/// Request body for `PUT /api/v1/auth/user/update`.
///
/// `role` and `status` are not accepted here.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelfUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub skills: Option<Vec<String>>,
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_id: Option<String>,
}

impl TryFrom<SelfUpdateRequest> for SelfProfileUpdate {
    type Error = Error;

    fn try_from(value: SelfUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: value.email.as_deref().map(parse_email).transpose()?,
            password: value.password.map(parse_password).transpose()?,
            image_id: parse_optional_id(value.image_id.as_deref(), FieldName::new("imageId"))?,
            profile: ProfileFields {
                first_name: value.first_name,
                last_name: value.last_name,
                phone_number: value.phone_number,
                position: value.position,
                department: value.department,
                skills: value.skills,
                date_of_birth: value.date_of_birth,
            }
            .into_patch()?,
        })
    }
}

/// Request body for `PUT /api/v1/admin/users/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminUserUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub skills: Option<Vec<String>>,
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
    #[schema(example = "team-lead")]
    pub role: Option<String>,
    #[schema(example = "on-leave")]
    pub status: Option<String>,
}

impl TryFrom<AdminUserUpdateRequest> for AdminUserPatch {
    type Error = Error;

    fn try_from(value: AdminUserUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: value.email.as_deref().map(parse_email).transpose()?,
            role: parse_optional_enum(value.role.as_deref(), FieldName::new("role"))?,
            status: parse_optional_enum(value.status.as_deref(), FieldName::new("status"))?,
            profile: ProfileFields {
                first_name: value.first_name,
                last_name: value.last_name,
                phone_number: value.phone_number,
                position: value.position,
                department: value.department,
                skills: value.skills,
                date_of_birth: value.date_of_birth,
            }
            .into_patch()?,
        })
    }
}

/// Public view of a user; never includes the password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    #[schema(example = "active")]
    pub status: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub skills: Vec<String>,
    pub date_of_birth: Option<String>,
    pub image_id: Option<String>,
    pub joined_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let profile = user.profile;
        Self {
            id: user.id.to_string(),
            username: user.username.into(),
            email: user.email.into(),
            role: user.role.as_str().to_owned(),
            status: user.status.as_str().to_owned(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            phone_number: profile.phone_number,
            position: profile.position,
            department: profile.department,
            skills: profile.skills,
            date_of_birth: profile.date_of_birth.map(|d| d.to_string()),
            image_id: user.image_id.map(|id| id.to_string()),
            joined_at: user.joined_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Query string for raw uploads.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// Metadata returned after storing a blob.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

impl From<BlobMetadata> for UploadResponse {
    fn from(meta: BlobMetadata) -> Self {
        Self {
            file_id: meta.id.to_string(),
            filename: meta.filename,
            content_type: meta.content_type,
            size: meta.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Role, UserStatus};
    use rstest::rstest;
    use serde_json::Value;

    fn field_of(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|d| d.get("field"))
            .and_then(Value::as_str)
    }

    fn registration() -> RegisterRequest {
        RegisterRequest {
            username: Some("alice".into()),
            email: Some("A@X.com".into()),
            password: Some("pw123456".into()),
            skills: Some(vec!["rust".into()]),
            date_of_birth: Some("1990-04-01".into()),
            ..RegisterRequest::default()
        }
    }

    #[test]
    fn registration_normalises_email_and_parses_profile() {
        let parsed = Registration::try_from(registration()).expect("valid registration");
        assert_eq!(parsed.username.as_str(), "alice");
        assert_eq!(parsed.email.as_str(), "a@x.com");
        assert_eq!(parsed.profile.skills, Some(vec!["rust".to_owned()]));
        assert!(parsed.profile.date_of_birth.is_some());
    }

    #[rstest]
    #[case(RegisterRequest { username: None, ..registration() }, "username")]
    #[case(RegisterRequest { username: Some("a!".into()), ..registration() }, "username")]
    #[case(RegisterRequest { email: Some("nope".into()), ..registration() }, "email")]
    #[case(RegisterRequest { password: Some("short".into()), ..registration() }, "password")]
    #[case(RegisterRequest { date_of_birth: Some("01/04/1990".into()), ..registration() }, "dateOfBirth")]
    fn invalid_registrations_name_the_field(#[case] request: RegisterRequest, #[case] field: &str) {
        let err = Registration::try_from(request).expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(field_of(&err), Some(field));
    }

    #[test]
    fn self_update_rejects_role_changes_at_parse_time() {
        let err = serde_json::from_str::<SelfUpdateRequest>(r#"{"role": "admin"}"#)
            .expect_err("role is not a self-update field");
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn admin_patch_parses_role_and_status() {
        let patch = AdminUserPatch::try_from(AdminUserUpdateRequest {
            role: Some("team-lead".into()),
            status: Some("on-leave".into()),
            ..AdminUserUpdateRequest::default()
        })
        .expect("valid patch");
        assert_eq!(patch.role, Some(Role::TeamLead));
        assert_eq!(patch.status, Some(UserStatus::OnLeave));
    }

    #[test]
    fn admin_patch_rejects_unknown_role() {
        let err = AdminUserPatch::try_from(AdminUserUpdateRequest {
            role: Some("superuser".into()),
            ..AdminUserUpdateRequest::default()
        })
        .expect_err("unknown role");
        assert_eq!(field_of(&err), Some("role"));
    }
}
