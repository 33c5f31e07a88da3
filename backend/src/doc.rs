//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` endpoint, the schema wrappers for
//! domain types and the session cookie security scheme. Swagger UI serves it
//! in debug builds and `cargo run --bin openapi-dump` exports it.

use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::dto::{MicropostBody, PageLinksBody, UserBody};
use crate::inbound::http::microposts::CreateMicropostRequest;
use crate::inbound::http::relationships::FollowRequest;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, FieldErrorSchema};
use crate::inbound::http::users::{RegisterRequest, UpdateProfileRequest, UserProfileBody};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login or POST /api/v1/users.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Micropost API",
        description = "Accounts, follows, posts and the home feed."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::show_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::promote_user,
        crate::inbound::http::users::list_following,
        crate::inbound::http::users::list_followers,
        crate::inbound::http::relationships::follow,
        crate::inbound::http::relationships::unfollow,
        crate::inbound::http::microposts::create_micropost,
        crate::inbound::http::microposts::delete_micropost,
        crate::inbound::http::microposts::list_user_microposts,
        crate::inbound::http::microposts::feed,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FieldErrorSchema,
        LoginRequest,
        RegisterRequest,
        UpdateProfileRequest,
        FollowRequest,
        CreateMicropostRequest,
        UserBody,
        UserProfileBody,
        MicropostBody,
        PageLinksBody,
    )),
    tags(
        (name = "users", description = "Registration, profiles and administration"),
        (name = "sessions", description = "Sign in and sign out"),
        (name = "relationships", description = "Follow graph"),
        (name = "microposts", description = "Posts and the home feed")
    )
)]
pub struct ApiDoc;
