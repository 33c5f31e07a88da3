//! Home feed: the viewer's posts merged with posts of everyone they follow.
//!
//! The author set is read from the relationship graph on every call, so an
//! unfollow takes effect on the next read. Storage pages the merged stream;
//! the engine re-sorts and de-duplicates the returned slice.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::debug;

use super::micropost::sort_newest_first;
use super::ports::{FeedEngine, MicropostRepository, RelationshipRepository, UserRepository};
use super::{Error, Micropost, UserId};

/// Feed engine backed by the three driven ports.
#[derive(Clone)]
pub struct FeedEngineService<U, R, M> {
    users: Arc<U>,
    relationships: Arc<R>,
    posts: Arc<M>,
}

impl<U, R, M> FeedEngineService<U, R, M> {
    /// Create a new feed engine.
    pub fn new(users: Arc<U>, relationships: Arc<R>, posts: Arc<M>) -> Self {
        Self {
            users,
            relationships,
            posts,
        }
    }
}

#[async_trait]
impl<U, R, M> FeedEngine for FeedEngineService<U, R, M>
where
    U: UserRepository,
    R: RelationshipRepository,
    M: MicropostRepository,
{
    async fn feed(&self, id: UserId, page: PageRequest) -> Result<Page<Micropost>, Error> {
        let found = self
            .users
            .find_by_id(&id)
            .await
            .map_err(Error::from)?;
        if found.is_none() {
            return Err(Error::not_found(format!("user {id} not found")));
        }

        let followed = self
            .relationships
            .following(&id)
            .await
            .map_err(Error::from)?;
        let authors: Vec<UserId> = std::iter::once(id)
            .chain(followed)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        debug!(user_id = %id, authors = authors.len(), "computing feed");

        let result = self
            .posts
            .list_by_authors(&authors, &page)
            .await
            .map_err(Error::from)?;
        Ok(result.map_items(|mut items| {
            sort_newest_first(&mut items);
            items.dedup_by_key(|post| post.id());
            items
        }))
    }
}
