//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`BlobStore`], [`PasswordHasher`],
//! [`TokenCodec`]) are implemented by outbound adapters. Driving ports
//! ([`LoginService`], [`GroupDirectory`], ...) are implemented by domain
//! services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod blob_store;
mod group_directory;
mod group_repository;
mod login_service;
mod media_library;
mod note_repository;
mod note_store;
mod password_hasher;
mod project_directory;
mod project_repository;
mod token_codec;
mod user_repository;

#[cfg(test)]
pub use account_service::{MockAccountService, MockUserAdministration};
pub use account_service::{AccountService, UserAdministration};
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError};
pub use group_directory::GroupDirectory;
#[cfg(test)]
pub use group_directory::MockGroupDirectory;
#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::{GroupRepository, GroupRepositoryError};
pub use login_service::{LoginService, TokenValidator};
#[cfg(test)]
pub use login_service::{MockLoginService, MockTokenValidator};
pub use media_library::MediaLibrary;
#[cfg(test)]
pub use media_library::MockMediaLibrary;
#[cfg(test)]
pub use note_repository::MockNoteRepository;
pub use note_repository::{NoteRepository, NoteRepositoryError};
#[cfg(test)]
pub use note_store::MockNoteStore;
pub use note_store::NoteStore;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use project_directory::MockProjectDirectory;
pub use project_directory::ProjectDirectory;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{EmbeddedWrite, ProjectRepository, ProjectRepositoryError};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
