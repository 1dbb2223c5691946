//! Tests for the group directory service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::fixtures::{claims, claims_for, fixed_clock, group, user};
use crate::domain::membership::MembershipWrite;
use crate::domain::ports::{GroupRepositoryError, MockGroupRepository, MockUserRepository};
use crate::domain::{EntityName, ErrorCode, Role, Visibility};

fn make_service(
    groups: MockGroupRepository,
    users: MockUserRepository,
) -> GroupDirectoryService<MockGroupRepository, MockUserRepository> {
    GroupDirectoryService::new(Arc::new(groups), Arc::new(users), fixed_clock())
}

fn draft(name: &str) -> NewGroup {
    NewGroup {
        name: EntityName::new(name).expect("valid name"),
        description: None,
        visibility: Some(Visibility::Private),
        icon: None,
    }
}

#[tokio::test]
async fn admin_creates_group_with_self_as_group_admin() {
    let caller = claims(Role::Admin);
    let caller_id = caller.user_id;
    let mut groups = MockGroupRepository::new();
    groups.expect_insert().times(1).return_once(|_| Ok(()));

    let created = make_service(groups, MockUserRepository::new())
        .create(&caller, draft("Eng"))
        .await
        .expect("create succeeds");

    assert_eq!(created.created_by, caller_id);
    assert_eq!(
        created.members.get(&caller_id).map(|m| m.role),
        Some(GroupRole::Admin)
    );
}

#[rstest]
#[case(Role::User)]
#[case(Role::TeamLead)]
#[tokio::test]
async fn non_admins_cannot_create_groups(#[case] role: Role) {
    let mut groups = MockGroupRepository::new();
    groups.expect_insert().never();

    let error = make_service(groups, MockUserRepository::new())
        .create(&claims(role), draft("Eng"))
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn duplicate_group_name_is_conflict() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_insert()
        .return_once(|_| Err(GroupRepositoryError::duplicate("name")));

    let error = make_service(groups, MockUserRepository::new())
        .create(&claims(Role::Admin), draft("Eng"))
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(Visibility::Public, false, true)]
#[case(Visibility::Private, true, true)]
#[case(Visibility::Private, false, false)]
#[tokio::test]
async fn get_applies_visibility(
    #[case] visibility: Visibility,
    #[case] is_member: bool,
    #[case] allowed: bool,
) {
    let carol = user("carol", Role::User);
    let members = if is_member { vec![carol.id] } else { Vec::new() };
    let stored = group("Eng", visibility, &members);
    let id = stored.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));

    let result = make_service(groups, MockUserRepository::new())
        .get(&claims_for(&carol), &id)
        .await;
    match (allowed, result) {
        (true, Ok(found)) => assert_eq!(found.id, id),
        (false, Err(error)) => assert_eq!(error.code(), ErrorCode::Forbidden),
        (expected, other) => panic!("expected allowed={expected}, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_group_is_not_found_even_for_non_admins() {
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_id().return_once(|_| Ok(None));

    let error = make_service(groups, MockUserRepository::new())
        .delete(&claims(Role::User), &GroupId::random())
        .await
        .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_applies_patch_for_admin() {
    let stored = group("Eng", Visibility::Private, &[]);
    let id = stored.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    groups
        .expect_update_details()
        .withf(|g| g.visibility == Visibility::Public)
        .return_once(|_| Ok(true));

    let patch = GroupPatch {
        visibility: Some(Visibility::Public),
        ..GroupPatch::default()
    };
    let updated = make_service(groups, MockUserRepository::new())
        .update(&claims(Role::Admin), &id, patch)
        .await
        .expect("update succeeds");
    assert!(updated.is_public());
}

#[tokio::test]
async fn add_member_requires_existing_user() {
    let stored = group("Eng", Visibility::Private, &[]);
    let id = stored.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    groups.expect_change_membership().never();
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let error = make_service(groups, users)
        .add_member(&claims(Role::Admin), &id, UserId::random(), None)
        .await
        .expect_err("unknown user");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_member_defaults_role_and_reports_duplicates() {
    let bob = user("bob", Role::User);
    let bob_id = bob.id;
    let stored = group("Eng", Visibility::Private, &[]);
    let id = stored.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    groups
        .expect_change_membership()
        .withf(move |_, change, _| {
            matches!(change, MembershipChange::Add(m) if m.user_id == bob_id && m.role == GroupRole::Member)
        })
        .return_once(|_, _, _| Ok(MembershipWrite::AlreadyMember));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(bob)));

    let error = make_service(groups, users)
        .add_member(&claims(Role::Admin), &id, bob_id, None)
        .await
        .expect_err("already a member");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn remove_absent_member_is_not_found() {
    let stored = group("Eng", Visibility::Private, &[]);
    let id = stored.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    groups
        .expect_change_membership()
        .return_once(|_, _, _| Ok(MembershipWrite::NotMember));

    let error = make_service(groups, MockUserRepository::new())
        .remove_member(&claims(Role::Admin), &id, &UserId::random())
        .await
        .expect_err("not a member");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn group_admin_without_global_role_cannot_manage_members() {
    let lead = user("lead", Role::TeamLead);
    let mut stored = group("Eng", Visibility::Private, &[]);
    stored
        .members
        .try_add(Member::new(lead.id, GroupRole::Admin, stored.created_at))
        .expect("fresh member");
    let id = stored.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    groups.expect_change_membership().never();

    let error = make_service(groups, MockUserRepository::new())
        .update_member_role(&claims_for(&lead), &id, &lead.id, GroupRole::Member)
        .await
        .expect_err("global admin required");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}
