//! Administrative user management.
//!
//! ```text
//! GET /api/v1/admin/users
//! GET /api/v1/admin/users/{id}
//! PUT /api/v1/admin/users/{id} {"role":"team-lead","status":"on-leave"}
//! DELETE /api/v1/admin/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::Deserialize;

use crate::domain::{AdminUserPatch, Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users_dto::{AdminUserUpdateRequest, UserResponse};
use crate::inbound::http::validation::{FieldName, parse_id};

#[derive(Debug, Deserialize)]
struct UserPath {
    id: String,
}

impl UserPath {
    fn user_id(&self) -> Result<UserId, Error> {
        parse_id(&self.id, FieldName::new("id"))
    }
}

/// List every user.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers",
    security(("BearerAuth" = []))
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let users = state.admin.list_users(caller.claims()).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminGetUser",
    security(("BearerAuth" = []))
)]
#[get("/admin/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<UserPath>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = path.user_id()?;
    let user = state.admin.get_user(caller.claims(), &id).await?;
    Ok(web::Json(user.into()))
}

/// Patch a user's profile, email, role or status.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = AdminUserUpdateRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Email taken", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateUser",
    security(("BearerAuth" = []))
)]
#[put("/admin/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<UserPath>,
    payload: web::Json<AdminUserUpdateRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = path.user_id()?;
    let patch = AdminUserPatch::try_from(payload.into_inner())?;
    let user = state.admin.update_user(caller.claims(), &id, patch).await?;
    Ok(web::Json(user.into()))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteUser",
    security(("BearerAuth" = []))
)]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<UserPath>,
) -> ApiResult<HttpResponse> {
    let id = path.user_id()?;
    state.admin.delete_user(caller.claims(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{claims_for, user};
    use crate::domain::{Role, UserStatus};
    use crate::inbound::http::test_utils::{MockPorts, bearer, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn scope(scope: actix_web::Scope) -> actix_web::Scope {
        scope
            .service(list_users)
            .service(get_user)
            .service(update_user)
            .service(delete_user)
    }

    fn admin_ports() -> MockPorts {
        MockPorts::signed_in(claims_for(&user("root", Role::Admin)))
    }

    #[actix_web::test]
    async fn get_parses_the_path_id() {
        let target = user("bob", Role::User);
        let target_id = target.id;
        let mut ports = admin_ports();
        ports.admin.expect_get_user().returning(move |_, id| {
            assert_eq!(*id, target_id);
            Ok(target.clone())
        });
        let app = actix_test::init_service(test_app(ports.into_state(), scope)).await;

        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/admin/users/{target_id}"))
            .insert_header(bearer())
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["id"], target_id.to_string());
    }

    #[actix_web::test]
    async fn malformed_id_names_the_field() {
        let app = actix_test::init_service(test_app(admin_ports().into_state(), scope)).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/admin/users/42")
            .insert_header(bearer())
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "id");
        assert_eq!(body["details"]["code"], "invalid_uuid");
    }

    #[actix_web::test]
    async fn update_forwards_role_and_status() {
        let target = user("bob", Role::User);
        let target_id = target.id;
        let mut ports = admin_ports();
        ports.admin.expect_update_user().returning(move |_, _, patch| {
            let mut updated = target.clone();
            updated.role = patch.role.unwrap_or(updated.role);
            updated.status = patch.status.unwrap_or(updated.status);
            Ok(updated)
        });
        let app = actix_test::init_service(test_app(ports.into_state(), scope)).await;

        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/admin/users/{target_id}"))
            .insert_header(bearer())
            .set_json(json!({"role": "team-lead", "status": "on-leave"}))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["role"], Role::TeamLead.as_str());
        assert_eq!(body["status"], UserStatus::OnLeave.as_str());
    }

    #[actix_web::test]
    async fn password_is_not_an_admin_field() {
        let app = actix_test::init_service(test_app(admin_ports().into_state(), scope)).await;

        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/admin/users/{}", UserId::random()))
            .insert_header(bearer())
            .set_json(json!({"password": "hunter22hunter"}))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(Ok(()), StatusCode::NO_CONTENT)]
    #[case(Err(Error::forbidden("cannot delete your own account")), StatusCode::FORBIDDEN)]
    #[case(Err(Error::not_found("user not found")), StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn delete_maps_outcomes(#[case] outcome: Result<(), Error>, #[case] status: StatusCode) {
        let mut ports = admin_ports();
        ports
            .admin
            .expect_delete_user()
            .return_once(move |_, _| outcome);
        let app = actix_test::init_service(test_app(ports.into_state(), scope)).await;

        let req = actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/users/{}", UserId::random()))
            .insert_header(bearer())
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), status);
    }
}
