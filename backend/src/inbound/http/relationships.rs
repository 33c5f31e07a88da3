//! Follow and unfollow endpoints.
//!
//! ```text
//! POST   /api/v1/relationships {"followedId":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}
//! DELETE /api/v1/relationships/{followedId}
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::parse_user_id;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Follow request body.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FollowRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub followed_id: String,
}

/// Follow a user. Following twice is not an error.
#[utoipa::path(
    post,
    path = "/api/v1/relationships",
    request_body = FollowRequest,
    responses(
        (status = 204, description = "Following"),
        (status = 400, description = "Cannot follow yourself", body = ErrorSchema),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "follow",
    security(("SessionCookie" = []))
)]
#[post("/relationships")]
pub async fn follow(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FollowRequest>,
) -> ApiResult<HttpResponse> {
    let followed = parse_user_id(&payload.followed_id)?;
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    state.graph.follow(&viewer, followed).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Stop following a user. Unfollowing someone not followed is not an error.
#[utoipa::path(
    delete,
    path = "/api/v1/relationships/{followedId}",
    params(("followedId" = String, Path, description = "User to unfollow")),
    responses(
        (status = 204, description = "Not following"),
        (status = 400, description = "Cannot unfollow yourself", body = ErrorSchema),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["relationships"],
    operation_id = "unfollow",
    security(("SessionCookie" = []))
)]
#[delete("/relationships/{followed_id}")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let followed = parse_user_id(&path)?;
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    state.graph.unfollow(&viewer, followed).await?;
    Ok(HttpResponse::NoContent().finish())
}
