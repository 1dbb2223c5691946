//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! tests can swap in in-memory adapters or mocks without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountService, GroupDirectory, LoginService, MediaLibrary, NoteStore, ProjectDirectory,
    TokenValidator, UserAdministration,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenValidator>,
    pub accounts: Arc<dyn AccountService>,
    pub admin: Arc<dyn UserAdministration>,
    pub groups: Arc<dyn GroupDirectory>,
    pub projects: Arc<dyn ProjectDirectory>,
    pub notes: Arc<dyn NoteStore>,
    pub media: Arc<dyn MediaLibrary>,
}
