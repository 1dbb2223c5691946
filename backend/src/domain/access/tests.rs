//! Decision tables for the access control policy.

use rstest::rstest;

use super::*;
use crate::domain::fixtures::{claims, claims_for, group, note, project, user};
use crate::domain::{ProjectId, UserId, Visibility};

#[test]
fn only_admin_holds_capabilities() {
    for role in Role::ALL {
        let expected = *role == Role::Admin;
        assert_eq!(
            !capabilities(*role).is_empty(),
            expected,
            "unexpected capability set for {role}"
        );
    }
}

#[rstest]
#[case(false, false, false, false)]
#[case(false, false, true, true)]
#[case(false, true, false, true)]
#[case(false, true, true, true)]
#[case(true, false, false, true)]
#[case(true, false, true, true)]
#[case(true, true, false, true)]
#[case(true, true, true, true)]
fn note_visibility_matrix(
    #[case] is_admin: bool,
    #[case] is_author: bool,
    #[case] is_public: bool,
    #[case] expected: bool,
) {
    let caller = claims(if is_admin { Role::Admin } else { Role::BackendDev });
    let author = if is_author { caller.user_id } else { UserId::random() };
    let target = note(author, ProjectId::random(), is_public);

    assert_eq!(can_view_note(&caller, &target), expected);
}

#[rstest]
#[case(false, false, false)]
#[case(false, true, true)]
#[case(true, false, true)]
#[case(true, true, true)]
fn note_mutation_requires_author_or_admin(
    #[case] is_admin: bool,
    #[case] is_author: bool,
    #[case] expected: bool,
) {
    let caller = claims(if is_admin { Role::Admin } else { Role::Designer });
    let author = if is_author { caller.user_id } else { UserId::random() };
    // Public visibility never grants write access.
    let target = note(author, ProjectId::random(), true);

    assert_eq!(can_mutate_note(&caller, &target), expected);
}

#[rstest]
#[case(Visibility::Public, false, true)]
#[case(Visibility::Public, true, true)]
#[case(Visibility::Private, true, true)]
#[case(Visibility::Private, false, false)]
fn group_visibility(
    #[case] visibility: Visibility,
    #[case] is_member: bool,
    #[case] expected: bool,
) {
    let caller = claims(Role::User);
    let members = if is_member { vec![caller.user_id] } else { Vec::new() };
    let target = group("Eng", visibility, &members);

    assert_eq!(can_view_group(&caller, &target), expected);
}

#[test]
fn private_group_is_not_visible_to_non_member_admin_by_membership_rule() {
    // Group visibility has no admin override: admins see private groups only
    // through membership.
    let caller = claims(Role::Admin);
    let target = group("Ops", Visibility::Private, &[]);
    assert!(!can_view_group(&caller, &target));
}

#[rstest]
#[case(Role::Admin, false, true)]
#[case(Role::Admin, true, true)]
#[case(Role::TeamLead, true, true)]
#[case(Role::TeamLead, false, false)]
fn project_visibility(#[case] role: Role, #[case] is_member: bool, #[case] expected: bool) {
    let caller = claims(role);
    let members = if is_member { vec![caller.user_id] } else { Vec::new() };
    let target = project("P1", crate::domain::GroupId::random(), &members);

    assert_eq!(can_view_project(&caller, &target), expected);
}

#[rstest]
#[case(Role::Admin, true)]
#[case(Role::ProjectManager, false)]
#[case(Role::ProductOwner, false)]
#[case(Role::User, false)]
fn structural_mutation_is_admin_only(#[case] role: Role, #[case] expected: bool) {
    let caller = claims(role);
    assert_eq!(can_admin_group(&caller), expected);
    assert_eq!(can_admin_project(&caller), expected);
}

#[test]
fn admins_cannot_edit_each_other() {
    let me = user("root", Role::Admin);
    let other = user("ops", Role::Admin);
    let plain = user("dev", Role::BackendDev);
    let caller = claims_for(&me);

    assert!(can_edit_user_record(&caller, &me));
    assert!(!can_edit_user_record(&caller, &other));
    assert!(can_edit_user_record(&caller, &plain));
}

#[test]
fn delete_rules_forbid_self_and_admins() {
    let me = user("root", Role::Admin);
    let other_admin = user("ops", Role::Admin);
    let plain = user("dev", Role::QaEngineer);
    let caller = claims_for(&me);

    assert!(!can_delete_user_record(&caller, &me));
    assert!(!can_delete_user_record(&caller, &other_admin));
    assert!(can_delete_user_record(&caller, &plain));
}

#[test]
fn non_admin_cannot_delete_anyone() {
    let caller = claims(Role::TeamLead);
    let target = user("dev", Role::User);
    assert!(!can_delete_user_record(&caller, &target));
}

#[test]
fn ensure_maps_denial_to_forbidden() {
    let err = ensure(false, "no").expect_err("denied");
    assert_eq!(err.code(), crate::domain::ErrorCode::Forbidden);
    assert!(ensure(true, "no").is_ok());
}
