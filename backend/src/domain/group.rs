//! Groups: named collections of users with a visibility setting.

use chrono::{DateTime, Utc};

use super::macros::wire_enum;
use super::membership::{Member, Roster};
use super::{GroupId, UserId};

/// Maximum length of a group or project name once trimmed.
pub const NAME_MAX: usize = 100;

wire_enum! {
    /// Who may see a group without being a member.
    pub enum Visibility("visibility") {
        Public => "public",
        Private => "private",
    }
}

wire_enum! {
    /// Role a user holds inside one group.
    pub enum GroupRole("group role") {
        Admin => "admin",
        Member => "member",
    }
}

/// Validated display name for groups and projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName(String);

/// Raised when a name is blank or too long.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("name must be between 1 and {NAME_MAX} characters")]
pub struct InvalidName;

impl EntityName {
    /// Trim and validate a name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidName> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || trimmed.chars().count() > NAME_MAX {
            return Err(InvalidName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for EntityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A group and its membership list.
///
/// ## Invariants
/// - `name` is unique across groups.
/// - `members` lists each user at most once and, at creation, contains the
///   creator as [`GroupRole::Admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: EntityName,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub icon: Option<String>,
    pub is_active: bool,
    pub members: Roster<GroupRole>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Build a new group whose only member is `creator`, as group admin.
    pub fn create(draft: NewGroup, creator: UserId, now: DateTime<Utc>) -> Self {
        let members = Roster::single(Member::new(creator, GroupRole::Admin, now));
        Self {
            id: GroupId::random(),
            name: draft.name,
            description: draft.description,
            visibility: draft.visibility.unwrap_or(Visibility::Private),
            icon: draft.icon,
            is_active: true,
            members,
            created_by: creator,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether anyone may discover the group.
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// Fields accepted when creating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: EntityName,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub icon: Option<String>,
}

/// Partial update of a group; membership and authorship are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatch {
    pub name: Option<EntityName>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

impl GroupPatch {
    /// Apply the patch to `group`, stamping `updated_at`.
    pub fn apply(self, group: &mut Group, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            group.name = name;
        }
        if let Some(description) = self.description {
            group.description = Some(description);
        }
        if let Some(visibility) = self.visibility {
            group.visibility = visibility;
        }
        if let Some(icon) = self.icon {
            group.icon = Some(icon);
        }
        if let Some(is_active) = self.is_active {
            group.is_active = is_active;
        }
        group.updated_at = now;
    }
}
