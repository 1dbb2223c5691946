//! Translation of driven-port failures into domain errors.
//!
//! Connection failures surface as `service_unavailable`, unique-key
//! collisions as `conflict`, and everything else as `internal`.

use super::Error;
use super::ports::{
    BlobStoreError, GroupRepositoryError, NoteRepositoryError, PasswordHashError,
    ProjectRepositoryError, TokenError, UserRepositoryError,
};

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Duplicate { field } => {
            Error::conflict(format!("a user with this {field} already exists"))
        }
    }
}

pub(crate) fn map_group_error(error: GroupRepositoryError) -> Error {
    match error {
        GroupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupRepositoryError::Query { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupRepositoryError::Duplicate { field } => {
            Error::conflict(format!("a group with this {field} already exists"))
        }
    }
}

pub(crate) fn map_project_error(error: ProjectRepositoryError) -> Error {
    match error {
        ProjectRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("project repository unavailable: {message}"))
        }
        ProjectRepositoryError::Query { message } => {
            Error::internal(format!("project repository error: {message}"))
        }
        ProjectRepositoryError::Duplicate { field } => {
            Error::conflict(format!("a project with this {field} already exists"))
        }
    }
}

pub(crate) fn map_note_error(error: NoteRepositoryError) -> Error {
    match error {
        NoteRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("note repository unavailable: {message}"))
        }
        NoteRepositoryError::Query { message } => {
            Error::internal(format!("note repository error: {message}"))
        }
    }
}

pub(crate) fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("blob store unavailable: {message}"))
        }
        BlobStoreError::Io { message } => Error::internal(format!("blob store error: {message}")),
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Invalid { .. } => Error::unauthorized("invalid token"),
        TokenError::Encoding { message } => {
            Error::internal(format!("token encoding failed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(UserRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(UserRepositoryError::duplicate("email"), ErrorCode::Conflict)]
    fn user_errors(#[case] error: UserRepositoryError, #[case] expected: ErrorCode) {
        assert_eq!(map_user_error(error).code(), expected);
    }

    #[test]
    fn duplicate_names_the_field() {
        let error = map_group_error(GroupRepositoryError::duplicate("name"));
        assert_eq!(error.message(), "a group with this name already exists");
    }

    #[test]
    fn invalid_tokens_hide_the_cause() {
        let error = map_token_error(TokenError::invalid("InvalidSignature"));
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), "invalid token");
    }

    #[test]
    fn blob_outage_is_unavailable() {
        let error = map_blob_error(BlobStoreError::unavailable("disk detached"));
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
