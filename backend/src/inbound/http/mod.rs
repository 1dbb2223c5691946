//! HTTP inbound adapter exposing the REST API under `/api/v1`.

pub mod accounts;
pub mod admin_users;
pub mod auth;
pub mod error;
pub mod groups;
pub mod health;
pub mod notes;
pub mod notes_dto;
pub mod projects;
pub mod projects_dto;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub mod users_dto;
pub mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;
use error::{json_error_handler, path_error_handler, query_error_handler};

/// Every API route, with extractor errors rendered as `invalid_request`.
///
/// Raw upload bodies above `max_upload_bytes` are refused with 413.
pub fn api_scope(max_upload_bytes: usize) -> Scope {
    web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PayloadConfig::new(max_upload_bytes))
        .service(accounts::register)
        .service(accounts::login)
        .service(accounts::current_user)
        .service(accounts::update_current_user)
        .service(accounts::replace_profile_image)
        .service(accounts::list_users)
        .service(accounts::upload)
        .service(accounts::get_image)
        .service(admin_users::list_users)
        .service(admin_users::get_user)
        .service(admin_users::update_user)
        .service(admin_users::delete_user)
        .service(groups::list_groups)
        .service(groups::create_group)
        .service(groups::get_group)
        .service(groups::update_group)
        .service(groups::delete_group)
        .service(groups::add_group_member)
        .service(groups::update_group_member_role)
        .service(groups::remove_group_member)
        .service(projects::list_projects)
        .service(projects::create_project)
        .service(projects::get_project)
        .service(projects::update_project)
        .service(projects::delete_project)
        .service(projects::add_project_member)
        .service(projects::remove_project_member)
        .service(projects::create_sprint)
        .service(projects::update_sprint)
        .service(notes::list_notes)
        .service(notes::create_note)
        .service(notes::get_note)
        .service(notes::update_note)
        .service(notes::delete_note)
        .service(notes::add_attachment)
        .service(notes::upload_attachment)
        .service(notes::remove_attachment)
}
