//! Micropost and feed endpoints.
//!
//! ```text
//! POST   /api/v1/microposts {"content":"Lorem ipsum"}
//! DELETE /api/v1/microposts/{id}
//! GET    /api/v1/users/{id}/microposts?page=1&perPage=30
//! GET    /api/v1/feed?page=1&perPage=30
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{
    MicropostBody, PageBody, PageQuery, parse_micropost_id, parse_user_id,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// New post body.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMicropostRequest {
    #[schema(example = "Lorem ipsum")]
    pub content: String,
}

/// Publish a post as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/microposts",
    request_body = CreateMicropostRequest,
    responses(
        (status = 201, description = "Published", body = MicropostBody),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["microposts"],
    operation_id = "createMicropost",
    security(("SessionCookie" = []))
)]
#[post("/microposts")]
pub async fn create_micropost(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateMicropostRequest>,
) -> ApiResult<HttpResponse> {
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    let post = state
        .content
        .create(&viewer, payload.into_inner().content)
        .await?;
    Ok(HttpResponse::Created().json(MicropostBody::from(&post)))
}

/// Delete one of the caller's posts.
#[utoipa::path(
    delete,
    path = "/api/v1/microposts/{id}",
    params(("id" = String, Path, description = "Micropost identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Unknown micropost", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["microposts"],
    operation_id = "deleteMicropost",
    security(("SessionCookie" = []))
)]
#[delete("/microposts/{id}")]
pub async fn delete_micropost(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_micropost_id(&path)?;
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    state.content.destroy(&viewer, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Posts by one user, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/microposts",
    params(("id" = String, Path, description = "Author identifier"), PageQuery),
    responses(
        (status = 200, description = "Posts", body = PageBody<MicropostBody>),
        (status = 400, description = "Invalid page parameters", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["microposts"],
    operation_id = "listUserMicroposts"
)]
#[get("/users/{id}/microposts")]
pub async fn list_user_microposts(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageBody<MicropostBody>>> {
    let author = parse_user_id(&path)?;
    let request = query.to_request()?;
    let page = state.content.posts_by(author, request).await?;
    Ok(web::Json(PageBody::from_page(
        page,
        &req.full_url(),
        |post| MicropostBody::from(post),
    )))
}

/// Home feed of the signed-in user: their own posts and those of everyone
/// they follow, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/feed",
    params(PageQuery),
    responses(
        (status = 200, description = "Feed page", body = PageBody<MicropostBody>),
        (status = 400, description = "Invalid page parameters", body = ErrorSchema),
        (status = 401, description = "Sign in required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["microposts"],
    operation_id = "feed",
    security(("SessionCookie" = []))
)]
#[get("/feed")]
pub async fn feed(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageBody<MicropostBody>>> {
    let viewer = session.viewer(state.sessions.as_ref()).await?;
    let me = viewer.require_user()?;
    let request = query.to_request()?;
    let page = state.feed.feed(me.id(), request).await?;
    Ok(web::Json(PageBody::from_page(
        page,
        &req.full_url(),
        |post| MicropostBody::from(post),
    )))
}
