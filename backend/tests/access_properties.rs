//! Uniqueness, visibility and non-cascading delete behaviour observed through
//! the HTTP surface.

#[allow(dead_code)]
mod support;

use actix_web::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::{Value, json};
use taskboard::domain::Role;
use taskboard::test_support::TestBackend;

use support::{call, field_values, seed_and_login, start};

fn registration(username: &str, email: &str) -> Value {
    json!({ "username": username, "email": email, "password": "long-enough" })
}

#[rstest]
#[case::same_username(registration("hana", "other@x.com"))]
#[case::same_email(registration("hanako", "hana@x.com"))]
#[actix_web::test]
async fn second_account_with_taken_identity_conflicts(#[case] second: Value) {
    let backend = TestBackend::new();
    let app = start(&backend).await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(registration("hana", "hana@x.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, Method::POST, "/auth/register", None, Some(second)).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], "conflict");
}

#[rstest]
#[case::public("public", StatusCode::OK, true)]
#[case::private("private", StatusCode::FORBIDDEN, false)]
#[actix_web::test]
async fn group_visibility_for_non_members(
    #[case] visibility: &str,
    #[case] expected_get: StatusCode,
    #[case] listed: bool,
) {
    let backend = TestBackend::new();
    let app = start(&backend).await;
    let (_, admin) = seed_and_login(&backend, &app, "root", Role::Admin).await;
    let (_, outsider) = seed_and_login(&backend, &app, "ivan", Role::User).await;

    let (_, group) = call(
        &app,
        Method::POST,
        "/groups",
        Some(&admin),
        Some(json!({ "name": "Ops", "visibility": visibility })),
    )
    .await;
    let group_id = group["id"].as_str().expect("group id");

    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/groups/{group_id}"),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, expected_get);

    let (_, list) = call(&app, Method::GET, "/groups", Some(&outsider), None).await;
    assert_eq!(field_values(&list, "name").contains(&"Ops".to_owned()), listed);
}

#[actix_web::test]
async fn duplicate_group_member_conflicts_without_growing_roster() {
    let backend = TestBackend::new();
    let app = start(&backend).await;
    let (_, admin) = seed_and_login(&backend, &app, "root", Role::Admin).await;
    let (judy, _) = seed_and_login(&backend, &app, "judy", Role::User).await;

    let (_, group) = call(
        &app,
        Method::POST,
        "/groups",
        Some(&admin),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let before = group["members"].as_array().expect("members").len();
    let path = format!("/groups/{}/members", group["id"].as_str().expect("group id"));
    let member = json!({ "userId": judy.id.to_string() });

    let (first, _) = call(&app, Method::POST, &path, Some(&admin), Some(member.clone())).await;
    let (second, body) = call(&app, Method::POST, &path, Some(&admin), Some(member)).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT, "{body}");

    let (_, reloaded) = call(
        &app,
        Method::GET,
        &format!("/groups/{}", group["id"].as_str().expect("group id")),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(
        reloaded["members"].as_array().expect("members").len(),
        before + 1
    );
}

#[rstest]
#[actix_web::test]
async fn note_visibility_matches_policy(
    #[values(false, true)] viewer_is_admin: bool,
    #[values(false, true)] viewer_is_author: bool,
    #[values(false, true)] is_public: bool,
) {
    let backend = TestBackend::new();
    let app = start(&backend).await;
    let (_, admin) = seed_and_login(&backend, &app, "root", Role::Admin).await;
    let viewer_role = if viewer_is_admin { Role::Admin } else { Role::User };
    let (_, viewer) = seed_and_login(&backend, &app, "viewer", viewer_role).await;
    let author = if viewer_is_author {
        viewer.clone()
    } else {
        seed_and_login(&backend, &app, "writer", Role::User).await.1
    };

    let (_, group) = call(
        &app,
        Method::POST,
        "/groups",
        Some(&admin),
        Some(json!({ "name": "Eng" })),
    )
    .await;
    let (_, project) = call(
        &app,
        Method::POST,
        "/projects",
        Some(&admin),
        Some(json!({ "name": "P1", "groupId": group["id"] })),
    )
    .await;
    let (_, note) = call(
        &app,
        Method::POST,
        "/notes",
        Some(&author),
        Some(json!({ "title": "Log", "projectId": project["id"], "isPublic": is_public })),
    )
    .await;
    let note_id = note["id"].as_str().expect("note id");

    let visible = viewer_is_admin || viewer_is_author || is_public;
    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/notes/{note_id}"),
        Some(&viewer),
        None,
    )
    .await;
    let expected = if visible {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };
    assert_eq!(status, expected);

    let (_, list) = call(&app, Method::GET, "/notes", Some(&viewer), None).await;
    assert_eq!(field_values(&list, "title").contains(&"Log".to_owned()), visible);
}

#[actix_web::test]
async fn deleting_sole_group_admin_leaves_group_in_place() {
    let backend = TestBackend::new();
    let app = start(&backend).await;
    let (root, admin) = seed_and_login(&backend, &app, "root", Role::Admin).await;
    let (gina, _) = seed_and_login(&backend, &app, "gina", Role::User).await;

    // Root leaves the roster below, so only public visibility keeps it readable.
    let (_, group) = call(
        &app,
        Method::POST,
        "/groups",
        Some(&admin),
        Some(json!({ "name": "Eng", "visibility": "public" })),
    )
    .await;
    let group_id = group["id"].as_str().expect("group id").to_owned();

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/members"),
        Some(&admin),
        Some(json!({ "userId": gina.id.to_string(), "roleInGroup": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/groups/{group_id}/members/{}", root.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/admin/users/{}", gina.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/groups/{group_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        field_values(&body["members"], "userId"),
        vec![gina.id.to_string()]
    );
}

#[actix_web::test]
async fn admins_cannot_delete_themselves_or_each_other() {
    let backend = TestBackend::new();
    let app = start(&backend).await;
    let (root, admin) = seed_and_login(&backend, &app, "root", Role::Admin).await;
    let (other, _) = seed_and_login(&backend, &app, "kim", Role::Admin).await;

    for target in [root.id, other.id] {
        let (status, _) = call(
            &app,
            Method::DELETE,
            &format!("/admin/users/{target}"),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
