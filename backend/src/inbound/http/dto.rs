//! Request and response bodies shared by several endpoints.

use pagination::{Page, PageRequest, PaginationError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Micropost, MicropostId, User, UserId};

/// `page` and `perPage` query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number, default 1.
    pub page: Option<u32>,
    /// Items per page, default 30, maximum 100.
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Validate into a [`PageRequest`].
    pub fn to_request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_query(self.page, self.per_page).map_err(map_pagination_error)
    }
}

fn map_pagination_error(error: PaginationError) -> Error {
    let field = match error {
        PaginationError::InvalidPage => "page",
        PaginationError::InvalidPerPage { .. } => "perPage",
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "fields": [{ "field": field, "code": "out_of_range", "message": error.to_string() }]
    }))
}

/// Parse a path segment as a user id. Malformed ids cannot name a record.
pub fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found("user not found"))
}

/// Parse a path segment as a micropost id.
pub fn parse_micropost_id(raw: &str) -> Result<MicropostId, Error> {
    MicropostId::new(raw).map_err(|_| Error::not_found("micropost not found"))
}

/// Public view of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Example User")]
    pub name: String,
    /// Present only on the caller's own record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub admin: bool,
    pub created_at: String,
}

impl UserBody {
    /// Public view without the email address.
    pub fn public(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().as_ref().to_owned(),
            email: None,
            admin: user.is_admin(),
            created_at: user.created_at().to_rfc3339(),
        }
    }

    /// View for the owner of the record.
    pub fn own(user: &User) -> Self {
        Self {
            email: Some(user.email().as_ref().to_owned()),
            ..Self::public(user)
        }
    }
}

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MicropostBody {
    pub id: String,
    pub author_id: String,
    #[schema(example = "Lorem ipsum")]
    pub content: String,
    pub created_at: String,
}

impl From<&Micropost> for MicropostBody {
    fn from(post: &Micropost) -> Self {
        Self {
            id: post.id().to_string(),
            author_id: post.author_id().to_string(),
            content: post.content().as_ref().to_owned(),
            created_at: post.created_at().to_rfc3339(),
        }
    }
}

/// Navigation URLs of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageLinksBody {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// Pagination envelope: `{ items, page, perPage, total, links }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageBody<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub links: PageLinksBody,
}

impl<T> PageBody<T> {
    /// Render `page` with links relative to the request URL.
    pub fn from_page<D, F>(page: Page<D>, base: &Url, to_body: F) -> Self
    where
        F: FnMut(&D) -> T,
    {
        let links = page.links(base);
        Self {
            items: page.items().iter().map(to_body).collect(),
            page: page.page(),
            per_page: page.per_page(),
            total: page.total(),
            links: PageLinksBody {
                self_link: links.self_link,
                next: links.next,
                prev: links.prev,
            },
        }
    }
}
