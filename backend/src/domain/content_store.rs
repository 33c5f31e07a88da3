//! Publishing, listing and removing microposts.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::micropost::{DEFAULT_MAX_CONTENT_CHARS, MicropostValidationError};
use super::ports::{ContentStore, MicropostRepository, UserRepository};
use super::validation::{FieldError, ValidationErrors};
use super::{Error, Micropost, MicropostId, PostContent, UserId, Viewer};

/// Content store backed by user and micropost repositories.
#[derive(Clone)]
pub struct ContentStoreService<U, M> {
    users: Arc<U>,
    posts: Arc<M>,
    clock: Arc<dyn Clock>,
    max_content_chars: usize,
}

impl<U, M> ContentStoreService<U, M> {
    /// Create a store accepting posts of up to 140 characters.
    pub fn new(users: Arc<U>, posts: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            posts,
            clock,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }

    /// Override the maximum post length.
    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }
}

impl<U, M> ContentStoreService<U, M>
where
    U: UserRepository,
    M: MicropostRepository,
{
    async fn ensure_author(&self, id: UserId) -> Result<(), Error> {
        let found = self
            .users
            .find_by_id(&id)
            .await
            .map_err(Error::from)?;
        match found {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("user {id} not found"))),
        }
    }
}

fn content_error(error: MicropostValidationError) -> Error {
    let code = match error {
        MicropostValidationError::EmptyContent => "blank",
        MicropostValidationError::ContentTooLong { .. } => "too_long",
        MicropostValidationError::InvalidId => "invalid",
    };
    let mut errors = ValidationErrors::default();
    errors.push(FieldError::new("content", code, error.to_string()));
    errors.into()
}

#[async_trait]
impl<U, M> ContentStore for ContentStoreService<U, M>
where
    U: UserRepository,
    M: MicropostRepository,
{
    async fn create(&self, viewer: &Viewer, content: String) -> Result<Micropost, Error> {
        let author = viewer.require_user()?.id();
        let content = PostContent::new(content, self.max_content_chars).map_err(content_error)?;
        self.ensure_author(author).await?;

        let post = Micropost::new(MicropostId::generate(), author, content, self.clock.utc());
        self.posts
            .insert(&post)
            .await
            .map_err(Error::from)?;
        info!(micropost_id = %post.id(), author_id = %author, "micropost created");
        Ok(post)
    }

    async fn posts_by(&self, author: UserId, page: PageRequest) -> Result<Page<Micropost>, Error> {
        self.ensure_author(author).await?;
        self.posts
            .list_by_authors(&[author], &page)
            .await
            .map_err(Error::from)
    }

    async fn destroy(&self, viewer: &Viewer, id: MicropostId) -> Result<(), Error> {
        let actor = viewer.require_user()?.id();
        let post = self.find(id).await?;
        if post.author_id() != actor {
            return Err(Error::forbidden("only the author may delete a micropost"));
        }
        let removed = self
            .posts
            .delete(&id)
            .await
            .map_err(Error::from)?;
        if !removed {
            return Err(Error::not_found(format!("micropost {id} not found")));
        }
        info!(micropost_id = %id, author_id = %actor, "micropost deleted");
        Ok(())
    }

    async fn find(&self, id: MicropostId) -> Result<Micropost, Error> {
        self.posts
            .find_by_id(&id)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found(format!("micropost {id} not found")))
    }
}

#[cfg(test)]
mod tests;
