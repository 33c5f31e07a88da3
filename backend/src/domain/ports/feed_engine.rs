//! Driving port for the home feed.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, Micropost, UserId};

/// Domain use-case port for feed reads.
#[async_trait]
pub trait FeedEngine: Send + Sync {
    /// Posts by `id` and everyone `id` follows, newest first.
    async fn feed(&self, id: UserId, page: PageRequest) -> Result<Page<Micropost>, Error>;
}
