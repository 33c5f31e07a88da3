//! Identity endpoints: registration, profiles, listings and administration.
//!
//! ```text
//! POST   /api/v1/users {"name":"Ada","email":"ada@example.com","password":"foobar","passwordConfirmation":"foobar"}
//! GET    /api/v1/users?page=1&perPage=30
//! GET    /api/v1/users/me
//! GET    /api/v1/users/{id}
//! PATCH  /api/v1/users/{id} {"name":"Ada L."}
//! DELETE /api/v1/users/{id}
//! POST   /api/v1/users/{id}/admin
//! GET    /api/v1/users/{id}/following
//! GET    /api/v1/users/{id}/followers
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::validation::{ProfileUpdate, RegistrationRequest};
use crate::domain::{ErrorCode, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{PageBody, PageQuery, UserBody, parse_user_id};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration body. Unknown fields, `admin` included, are rejected.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: Option<String>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(value: RegisterRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: Zeroizing::new(value.password),
            password_confirmation: value.password_confirmation.map(Zeroizing::new),
        }
    }
}

/// Profile edit body. Absent fields keep their current value.
#[derive(Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(value: UpdateProfileRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: value.password.map(Zeroizing::new),
            password_confirmation: value.password_confirmation.map(Zeroizing::new),
        }
    }
}

/// Profile page: the identity plus its follow counts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileBody {
    pub user: UserBody,
    pub following: u64,
    pub followers: u64,
    /// Whether the signed-in caller follows this user; absent when anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followed_by_viewer: Option<bool>,
}

/// Register an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered and signed in", body = UserBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.identity.create(payload.into_inner().into()).await?;
    let artifact = state.sessions.sign_in(&user).await?;
    session.persist(&artifact)?;
    Ok(HttpResponse::Created().json(UserBody::own(&user)))
}

/// List identities in registration order.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Users", body = PageBody<UserBody>),
        (status = 400, description = "Invalid page parameters", body = ErrorSchema),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("SessionCookie" = []))
)]
#[get("/users")]
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageBody<UserBody>>> {
    session
        .viewer(state.sessions.as_ref())
        .await?
        .require_user()?;
    let request = query.to_request()?;
    let page = state.identity.list(request).await?;
    Ok(web::Json(PageBody::from_page(
        page,
        &req.full_url(),
        UserBody::public,
    )))
}

/// The signed-in identity.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserBody),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserBody>> {
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    Ok(web::Json(UserBody::own(viewer.require_user()?)))
}

/// Profile of one identity with follow counts.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Profile", body = UserProfileBody),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "showUser"
)]
#[get("/users/{id}")]
pub async fn show_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserProfileBody>> {
    let id = parse_user_id(&path)?;
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    let user = state.identity.find_by_id(id).await?;
    let counts = state.graph.counts(id).await?;

    let followed_by_viewer = match viewer.user() {
        Some(me) if me.id() != id => Some(state.graph.is_following(me.id(), id).await?),
        Some(_) | None => None,
    };
    let body = if viewer.user().is_some_and(|me| me.id() == id) {
        UserBody::own(&user)
    } else {
        UserBody::public(&user)
    };

    Ok(web::Json(UserProfileBody {
        user: body,
        following: counts.following,
        followers: counts.followers,
        followed_by_viewer,
    }))
}

/// Edit the caller's own profile; the session is re-issued.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = UserBody),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 403, description = "Not the caller's profile", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("SessionCookie" = []))
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<UserBody>> {
    let id = parse_user_id(&path)?;
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    let signed_in = state
        .identity
        .update(&viewer, id, payload.into_inner().into())
        .await?;
    session.persist(&signed_in.session)?;
    Ok(web::Json(UserBody::own(&signed_in.user)))
}

/// Delete an identity with its posts and relationships. Administrators only.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 403, description = "Not an administrator, or own account", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser",
    security(("SessionCookie" = []))
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    let outcome = state.identity.destroy(&viewer, id).await?;
    info!(
        user_id = %id,
        microposts = outcome.microposts_deleted,
        relationships = outcome.relationships_deleted,
        "user deleted over HTTP"
    );
    Ok(HttpResponse::NoContent().finish())
}

/// Grant administrator rights. Administrators only.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/admin",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Promoted", body = UserBody),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 403, description = "Not an administrator", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "promoteUser",
    security(("SessionCookie" = []))
)]
#[post("/users/{id}/admin")]
pub async fn promote_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserBody>> {
    let id = parse_user_id(&path)?;
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    let user = state.identity.promote(&viewer, id).await?;
    Ok(web::Json(UserBody::public(&user)))
}

async fn resolve_users(state: &HttpState, ids: Vec<UserId>) -> ApiResult<Vec<UserBody>> {
    let mut bodies = Vec::with_capacity(ids.len());
    for id in ids {
        match state.identity.find_by_id(id).await {
            Ok(user) => bodies.push(UserBody::public(&user)),
            // Deleted between the edge read and this lookup.
            Err(error) if error.code() == ErrorCode::NotFound => {}
            Err(error) => return Err(error),
        }
    }
    Ok(bodies)
}

async fn require_signed_in(state: &HttpState, session: &SessionContext) -> ApiResult<()> {
    session
        .viewer(state.sessions.as_ref())
        .await?
        .require_user()
        .map(|_| ())
}

/// Users the given user follows.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/following",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Followed users", body = [UserBody]),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "listFollowing",
    security(("SessionCookie" = []))
)]
#[get("/users/{id}/following")]
pub async fn list_following(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserBody>>> {
    require_signed_in(&state, &session).await?;
    let id = parse_user_id(&path)?;
    let ids = state.graph.following(id).await?;
    Ok(web::Json(resolve_users(&state, ids).await?))
}

/// Users following the given user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/followers",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Followers", body = [UserBody]),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "listFollowers",
    security(("SessionCookie" = []))
)]
#[get("/users/{id}/followers")]
pub async fn list_followers(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserBody>>> {
    require_signed_in(&state, &session).await?;
    let id = parse_user_id(&path)?;
    let ids = state.graph.followers(id).await?;
    Ok(web::Json(resolve_users(&state, ids).await?))
}

#[cfg(test)]
mod tests;
