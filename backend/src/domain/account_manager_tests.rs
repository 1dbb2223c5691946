//! Tests for registration, self-service updates and user administration.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::fixtures::{blob_metadata, claims, claims_for, fixed_clock, upload, user};
use crate::domain::ports::{
    BlobStoreError, MockBlobStore, MockPasswordHasher, MockUserRepository, UserRepositoryError,
};
use crate::domain::{
    EmailAddress, ErrorCode, Password, PasswordHash, ProfilePatch, Username,
};

type Manager = AccountManager<MockUserRepository, MockPasswordHasher, MockBlobStore>;

fn make_manager(
    users: MockUserRepository,
    hasher: MockPasswordHasher,
    blobs: MockBlobStore,
) -> Manager {
    AccountManager::new(Arc::new(users), Arc::new(hasher), Arc::new(blobs), fixed_clock())
}

fn registration(username: &str) -> Registration {
    Registration {
        username: Username::new(username).expect("valid username"),
        email: EmailAddress::new(format!("{username}@example.com")).expect("valid email"),
        password: Password::new("pw123456").expect("strong password"),
        profile: ProfilePatch {
            department: Some("Platform".into()),
            ..ProfilePatch::default()
        },
    }
}

fn hashing() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("$argon2id$fixture")));
    hasher
}

#[tokio::test]
async fn register_forces_user_role_and_active_status() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|u| u.role == Role::User && u.status == UserStatus::Active)
        .times(1)
        .return_once(|_| Ok(()));

    let created = make_manager(users, hashing(), MockBlobStore::new())
        .register(registration("alice"))
        .await
        .expect("registration succeeds");

    assert_eq!(created.username.as_str(), "alice");
    assert_eq!(created.profile.department.as_deref(), Some("Platform"));
    assert_eq!(created.password_hash.as_str(), "$argon2id$fixture");
}

#[tokio::test]
async fn register_reports_duplicates_as_conflict() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .return_once(|_| Err(UserRepositoryError::duplicate("username")));

    let error = make_manager(users, hashing(), MockBlobStore::new())
        .register(registration("alice"))
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn current_user_is_not_found_after_deletion() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let error = make_manager(users, MockPasswordHasher::new(), MockBlobStore::new())
        .current_user(&claims(Role::User))
        .await
        .expect_err("deleted");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_profile_rehashes_password_and_checks_image() {
    let alice = user("alice", Role::User);
    let caller = claims_for(&alice);
    let image = BlobId::random();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(alice)));
    users
        .expect_update()
        .withf(move |u| u.image_id == Some(image) && u.role == Role::User)
        .times(1)
        .return_once(|_| Ok(true));
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_metadata()
        .with(eq(image))
        .return_once(move |id| Ok(Some(blob_metadata(*id))));

    let update = SelfProfileUpdate {
        password: Some(Password::new("new-password").expect("strong")),
        image_id: Some(image),
        ..SelfProfileUpdate::default()
    };
    let updated = make_manager(users, hashing(), blobs)
        .update_profile(&caller, update)
        .await
        .expect("update succeeds");
    assert_eq!(updated.password_hash.as_str(), "$argon2id$fixture");
}

#[tokio::test]
async fn update_profile_rejects_unknown_image() {
    let alice = user("alice", Role::User);
    let caller = claims_for(&alice);
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(alice)));
    users.expect_update().never();
    let mut blobs = MockBlobStore::new();
    blobs.expect_metadata().return_once(|_| Ok(None));

    let update = SelfProfileUpdate {
        image_id: Some(BlobId::random()),
        ..SelfProfileUpdate::default()
    };
    let error = make_manager(users, MockPasswordHasher::new(), blobs)
        .update_profile(&caller, update)
        .await
        .expect_err("missing image");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn replace_image_compensates_when_record_update_fails() {
    let alice = user("alice", Role::User);
    let caller = claims_for(&alice);
    let stored = BlobId::random();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(alice)));
    users
        .expect_update()
        .return_once(|_| Err(UserRepositoryError::connection("reset")));
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_put()
        .return_once(move |_| Ok(blob_metadata(stored)));
    blobs
        .expect_delete()
        .with(eq(stored))
        .times(1)
        .return_once(|_| Ok(true));

    let error = make_manager(users, MockPasswordHasher::new(), blobs)
        .replace_profile_image(&caller, upload("me.png", "image/png"))
        .await
        .expect_err("phase two fails");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn replace_image_discards_previous_blob() {
    let previous = BlobId::random();
    let stored = BlobId::random();
    let mut alice = user("alice", Role::User);
    alice.image_id = Some(previous);
    let caller = claims_for(&alice);
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(alice)));
    users.expect_update().return_once(|_| Ok(true));
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_put()
        .return_once(move |_| Ok(blob_metadata(stored)));
    blobs
        .expect_delete()
        .with(eq(previous))
        .times(1)
        .return_once(|_| Err(BlobStoreError::io("permission denied")));

    let updated = make_manager(users, MockPasswordHasher::new(), blobs)
        .replace_profile_image(&caller, upload("me.png", "image/png"))
        .await
        .expect("swap succeeds even if cleanup fails");
    assert_eq!(updated.image_id, Some(stored));
}

#[rstest]
#[case(Role::User)]
#[case(Role::ProjectManager)]
#[tokio::test]
async fn administration_requires_admin(#[case] role: Role) {
    let manager = make_manager(
        MockUserRepository::new(),
        MockPasswordHasher::new(),
        MockBlobStore::new(),
    );
    let error = manager
        .list_users(&claims(role))
        .await
        .expect_err("not an admin");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn admin_cannot_edit_another_admin() {
    let other = user("other", Role::Admin);
    let other_id = other.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(other)));
    users.expect_update().never();

    let error = make_manager(users, MockPasswordHasher::new(), MockBlobStore::new())
        .update_user(&claims(Role::Admin), &other_id, AdminUserPatch::default())
        .await
        .expect_err("other admin");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(Some(Role::User), None)]
#[case(None, Some(UserStatus::Inactive))]
#[case(None, Some(UserStatus::OnLeave))]
#[tokio::test]
async fn admin_cannot_demote_or_deactivate_itself(
    #[case] role: Option<Role>,
    #[case] status: Option<UserStatus>,
) {
    let root = user("root", Role::Admin);
    let caller = claims_for(&root);
    let root_id = root.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(root)));
    users.expect_update().never();

    let patch = AdminUserPatch {
        role,
        status,
        ..AdminUserPatch::default()
    };
    let error = make_manager(users, MockPasswordHasher::new(), MockBlobStore::new())
        .update_user(&caller, &root_id, patch)
        .await
        .expect_err("self demotion");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn admin_may_edit_own_profile_fields() {
    let root = user("root", Role::Admin);
    let caller = claims_for(&root);
    let root_id = root.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(root)));
    users.expect_update().times(1).return_once(|_| Ok(true));

    let patch = AdminUserPatch {
        role: Some(Role::Admin),
        profile: ProfilePatch {
            position: Some("CTO".into()),
            ..ProfilePatch::default()
        },
        ..AdminUserPatch::default()
    };
    let updated = make_manager(users, MockPasswordHasher::new(), MockBlobStore::new())
        .update_user(&caller, &root_id, patch)
        .await
        .expect("own profile edit");
    assert_eq!(updated.profile.position.as_deref(), Some("CTO"));
}

#[tokio::test]
async fn admin_promotes_regular_user() {
    let bob = user("bob", Role::User);
    let bob_id = bob.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(bob)));
    users
        .expect_update()
        .withf(|u| u.role == Role::TeamLead)
        .return_once(|_| Ok(true));

    let patch = AdminUserPatch {
        role: Some(Role::TeamLead),
        ..AdminUserPatch::default()
    };
    let updated = make_manager(users, MockPasswordHasher::new(), MockBlobStore::new())
        .update_user(&claims(Role::Admin), &bob_id, patch)
        .await
        .expect("promotion");
    assert_eq!(updated.role, Role::TeamLead);
}

#[tokio::test]
async fn admin_cannot_delete_itself() {
    let root = user("root", Role::Admin);
    let caller = claims_for(&root);
    let root_id = root.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(root)));
    users.expect_delete().never();

    let error = make_manager(users, MockPasswordHasher::new(), MockBlobStore::new())
        .delete_user(&caller, &root_id)
        .await
        .expect_err("self delete");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn delete_checks_existence_before_policy() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().return_once(|_| Ok(None));

    let error = make_manager(users, MockPasswordHasher::new(), MockBlobStore::new())
        .delete_user(&claims(Role::Admin), &UserId::random())
        .await
        .expect_err("missing user");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn admin_deletes_regular_user() {
    let bob = user("bob", Role::Designer);
    let bob_id = bob.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(bob)));
    users
        .expect_delete()
        .with(eq(bob_id))
        .times(1)
        .return_once(|_| Ok(true));

    make_manager(users, MockPasswordHasher::new(), MockBlobStore::new())
        .delete_user(&claims(Role::Admin), &bob_id)
        .await
        .expect("delete succeeds");
}
