//! Builders for domain values shared by unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::membership::{Member, Roster};
use super::{
    BlobId, BlobMetadata, BlobUpload, Claims, EmailAddress, EntityName, Group, GroupId, GroupRole, Methodology, Note, NoteId,
    NoteStatus, ContentFormat, PasswordHash, Priority, Project, ProjectId, ProjectMetrics,
    ProjectRole, ProjectStatus, Role, User, UserId, UserProfile, UserStatus, Username, Visibility,
};

/// Fixed instant used by fixtures so assertions stay deterministic.
pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .expect("valid fixture instant")
}

/// Clock frozen at a chosen instant.
pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(epoch()))
}

pub(crate) fn claims_for(user: &User) -> Claims {
    Claims::issue(user.id, user.username.as_str(), user.role, epoch())
}

pub(crate) fn claims(role: Role) -> Claims {
    Claims::issue(UserId::random(), "caller", role, epoch())
}

pub(crate) fn user(name: &str, role: Role) -> User {
    User {
        id: UserId::random(),
        username: Username::new(name).expect("fixture username"),
        email: EmailAddress::new(format!("{name}@example.com")).expect("fixture email"),
        password_hash: PasswordHash::new(format!("hash:{name}")),
        role,
        status: UserStatus::Active,
        profile: UserProfile::default(),
        image_id: None,
        joined_at: epoch(),
        updated_at: epoch(),
    }
}

pub(crate) fn group(name: &str, visibility: Visibility, members: &[UserId]) -> Group {
    let roster = Roster::from_members(
        members
            .iter()
            .map(|id| Member::new(*id, GroupRole::Member, epoch()))
            .collect(),
    )
    .expect("unique fixture members");
    Group {
        id: GroupId::random(),
        name: EntityName::new(name).expect("fixture name"),
        description: None,
        visibility,
        icon: None,
        is_active: true,
        members: roster,
        created_by: UserId::random(),
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub(crate) fn project(name: &str, group: GroupId, members: &[UserId]) -> Project {
    let roster = Roster::from_members(
        members
            .iter()
            .map(|id| Member::new(*id, ProjectRole::Developer, epoch()))
            .collect(),
    )
    .expect("unique fixture members");
    Project {
        id: ProjectId::random(),
        name: EntityName::new(name).expect("fixture name"),
        description: None,
        group,
        status: ProjectStatus::Planning,
        methodology: Methodology::Scrum,
        priority: Priority::Medium,
        start_date: None,
        target_end_date: None,
        actual_end_date: None,
        tags: Vec::new(),
        metrics: ProjectMetrics::default(),
        is_active: true,
        members: roster,
        sprints: Vec::new(),
        kanban_columns: Vec::new(),
        created_by: UserId::random(),
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub(crate) fn note(author: UserId, project: ProjectId, is_public: bool) -> Note {
    Note {
        id: NoteId::random(),
        title: "Standup".into(),
        content: "notes".into(),
        content_format: ContentFormat::Markdown,
        project,
        sprint: None,
        author,
        tags: Vec::new(),
        status: NoteStatus::Published,
        is_public,
        pinned: false,
        attachments: Vec::new(),
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub(crate) fn upload(filename: &str, content_type: &str) -> BlobUpload {
    BlobUpload::new(
        Some(filename.to_owned()),
        Some(content_type.to_owned()),
        b"fixture bytes".to_vec(),
    )
    .expect("valid fixture upload")
}

pub(crate) fn blob_metadata(id: BlobId) -> BlobMetadata {
    BlobMetadata {
        id,
        filename: "avatar.png".into(),
        content_type: "image/png".into(),
        size: 13,
        sha256: "00".repeat(32),
        uploaded_at: epoch(),
    }
}
