//! Access control policy.
//!
//! Pure decision functions over caller [`Claims`] and loaded resource state.
//! Global roles map to capabilities through [`capabilities`]; the per-resource
//! rules (membership, authorship, visibility) are layered on top. Nothing
//! here performs I/O or mutates state.
//!
//! Group and project mutation is gated on the global `admin` role only. A
//! user holding the `admin` role inside one group gains no extra rights over
//! it.

use super::{Claims, Error, Group, Note, Project, Role, User};

/// Action a global role may be entitled to regardless of resource ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create, update and delete groups and their memberships.
    ManageGroups,
    /// Create, update and delete projects, memberships and sprints.
    ManageProjects,
    /// List, edit and delete other users' records.
    ManageUsers,
    /// Read every group, project and note.
    ReadAll,
    /// Edit or delete notes authored by others.
    ModerateNotes,
}

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ManageGroups,
    Capability::ManageProjects,
    Capability::ManageUsers,
    Capability::ReadAll,
    Capability::ModerateNotes,
];

/// Capabilities granted to a global role.
///
/// Only `admin` holds any; every other role relies on membership and
/// authorship alone.
pub const fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Admin => ADMIN_CAPABILITIES,
        Role::User
        | Role::TeamLead
        | Role::ProjectManager
        | Role::BackendDev
        | Role::FrontendDev
        | Role::FullstackDev
        | Role::Designer
        | Role::QaEngineer
        | Role::DevopsEngineer
        | Role::DataScientist
        | Role::ProductOwner => &[],
    }
}

/// Whether `claims` grants `capability`.
pub fn has_capability(claims: &Claims, capability: Capability) -> bool {
    capabilities(claims.role).contains(&capability)
}

/// Turn a denied decision into a forbidden error.
pub fn ensure(allowed: bool, message: &str) -> Result<(), Error> {
    if allowed {
        Ok(())
    } else {
        tracing::debug!(reason = message, "access denied");
        Err(Error::forbidden(message))
    }
}

/// Public groups are visible to everyone; private ones to members.
pub fn can_view_group(claims: &Claims, group: &Group) -> bool {
    group.is_public() || group.members.contains(&claims.user_id)
}

/// Group mutation requires the global group-management capability.
pub fn can_admin_group(claims: &Claims) -> bool {
    has_capability(claims, Capability::ManageGroups)
}

/// Projects are visible to their members and to global readers.
pub fn can_view_project(claims: &Claims, project: &Project) -> bool {
    has_capability(claims, Capability::ReadAll) || project.members.contains(&claims.user_id)
}

/// Project mutation requires the global project-management capability.
pub fn can_admin_project(claims: &Claims) -> bool {
    has_capability(claims, Capability::ManageProjects)
}

/// Notes are visible to their author, to everyone when public, and to
/// global readers.
pub fn can_view_note(claims: &Claims, note: &Note) -> bool {
    has_capability(claims, Capability::ReadAll) || note.author == claims.user_id || note.is_public
}

/// Only the author or a moderator may change or delete a note.
pub fn can_mutate_note(claims: &Claims, note: &Note) -> bool {
    has_capability(claims, Capability::ModerateNotes) || note.author == claims.user_id
}

/// Any record is editable except another admin's.
pub fn can_edit_user_record(claims: &Claims, target: &User) -> bool {
    !(target.is_admin() && target.id != claims.user_id)
}

/// User managers may delete any non-admin record other than their own.
pub fn can_delete_user_record(claims: &Claims, target: &User) -> bool {
    if target.id == claims.user_id || target.is_admin() {
        return false;
    }
    has_capability(claims, Capability::ManageUsers)
}

#[cfg(test)]
mod tests;
