//! Opaque UUID-backed identifiers for every aggregate and sub-entity.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an identifier string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidId {
    kind: &'static str,
}

impl InvalidId {
    /// Human-readable name of the identifier that failed to parse.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identifier from its textual UUID form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, InvalidId> {
                let raw = id.as_ref();
                if raw.trim() != raw {
                    return Err(InvalidId { kind: $kind });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| InvalidId { kind: $kind })
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Stable user identifier.
    UserId,
    "user id"
);
define_id!(
    /// Stable group identifier.
    GroupId,
    "group id"
);
define_id!(
    /// Stable project identifier.
    ProjectId,
    "project id"
);
define_id!(
    /// Identifier of a sprint embedded in a project.
    SprintId,
    "sprint id"
);
define_id!(
    /// Stable note identifier.
    NoteId,
    "note id"
);
define_id!(
    /// Identifier of an attachment embedded in a note.
    AttachmentId,
    "attachment id"
);
define_id!(
    /// Opaque key of a stored blob.
    BlobId,
    "blob id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("not-a-uuid")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    fn rejects_malformed_ids(#[case] raw: &str) {
        let err = GroupId::new(raw).expect_err("malformed id");
        assert_eq!(err.kind(), "group id");
        assert_eq!(err.to_string(), "group id must be a valid UUID");
    }

    #[test]
    fn serialises_as_bare_uuid_string() {
        let id = NoteId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, format!("\"{}\"", Uuid::nil()));
    }

    #[test]
    fn parses_canonical_text() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id: UserId = raw.parse().expect("valid id");
        assert_eq!(id.to_string(), raw);
    }
}
