//! HTTP inbound adapter exposing REST endpoints under `/api/v1`.

pub mod auth;
pub mod dto;
pub mod error;
pub mod microposts;
pub mod relationships;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

use actix_web::web;

/// Register every endpoint on `cfg`. Literal paths such as `/users/me` are
/// registered ahead of `/users/{id}` so they are not shadowed.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(auth::login)
        .service(auth::logout)
        .service(users::register)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::show_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(users::promote_user)
        .service(users::list_following)
        .service(users::list_followers)
        .service(microposts::list_user_microposts)
        .service(microposts::create_micropost)
        .service(microposts::delete_micropost)
        .service(microposts::feed)
        .service(relationships::follow)
        .service(relationships::unfollow);
}
