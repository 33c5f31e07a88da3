//! Driving port for publishing and removing microposts.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, Micropost, MicropostId, UserId, Viewer};

/// Domain use-case port for posts.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Publish a post authored by the viewer.
    async fn create(&self, viewer: &Viewer, content: String) -> Result<Micropost, Error>;

    /// Page through one author's posts, newest first.
    async fn posts_by(&self, author: UserId, page: PageRequest) -> Result<Page<Micropost>, Error>;

    /// Delete one of the viewer's own posts.
    async fn destroy(&self, viewer: &Viewer, id: MicropostId) -> Result<(), Error>;

    /// Look up a single post.
    async fn find(&self, id: MicropostId) -> Result<Micropost, Error>;
}
