//! Domain primitives, access policy and services.
//!
//! Purpose: define the strongly typed entities of the task board (users,
//! groups, projects, notes and stored files), the pure access-control policy
//! over them, and the services that implement the driving ports in
//! [`ports`]. Nothing in this module depends on actix or diesel.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`User`], [`Group`], [`Project`], [`Note`]: aggregates owned by their
//!   directories.
//! - [`access`]: allow/deny decisions over [`Claims`] and loaded state.
//! - [`CredentialService`], [`AccountManager`], [`GroupDirectoryService`],
//!   [`ProjectDirectoryService`], [`NoteStoreService`], [`MediaService`]:
//!   use-case implementations.

pub mod access;
mod account_manager;
mod auth;
mod blob;
mod credential_service;
pub mod error;
mod group;
mod group_directory_service;
mod ids;
mod macros;
pub mod membership;
mod media_service;
mod note;
mod note_store_service;
pub mod ports;
mod project;
mod project_directory_service;
mod repository_errors;
mod trace_id;
mod user;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::account_manager::AccountManager;
pub use self::auth::{
    Claims, IssuedToken, LoginCredentials, LoginValidationError, PASSWORD_MIN, Password,
    Registration, TOKEN_TTL, WeakPassword,
};
pub use self::blob::{
    Blob, BlobMetadata, BlobUpload, BlobValidationError, DEFAULT_CONTENT_TYPE,
};
pub use self::credential_service::CredentialService;
pub use self::error::{Error, ErrorCode};
pub use self::group::{
    EntityName, Group, GroupPatch, GroupRole, InvalidName, NAME_MAX, NewGroup, Visibility,
};
pub use self::group_directory_service::GroupDirectoryService;
pub use self::ids::{
    AttachmentId, BlobId, GroupId, InvalidId, NoteId, ProjectId, SprintId, UserId,
};
pub use self::macros::UnknownValue;
pub use self::membership::{Member, Roster};
pub use self::media_service::MediaService;
pub use self::note::{
    Attachment, AttachmentDraft, ContentFormat, EmptyTitle, NewNote, Note, NoteFilter, NotePatch,
    NoteScope, NoteStatus, normalise_tags,
};
pub use self::note_store_service::NoteStoreService;
pub use self::project::{
    CompletionPercentage, KanbanColumn, KanbanColumnDraft, Methodology, NewProject, NewSprint,
    Priority, Project, ProjectMetrics, ProjectPatch, ProjectRole, ProjectStatus,
    ProjectValidationError, Sprint, SprintProgress, SprintStatus, build_board,
};
pub use self::project_directory_service::ProjectDirectoryService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AdminUserPatch, EmailAddress, PasswordHash, ProfilePatch, Role, SelfProfileUpdate, User,
    UserProfile, UserStatus, UserValidationError, Username, USERNAME_MAX, USERNAME_MIN,
};
