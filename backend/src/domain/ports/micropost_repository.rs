//! Port abstraction for micropost persistence.
use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, Micropost, MicropostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by micropost repository adapters.
    pub enum MicropostPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "micropost repository connection failed: {message}"
            as Error::service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "micropost repository query failed: {message}"
            as Error::internal,
    }
}

/// Storage for posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MicropostRepository: Send + Sync {
    /// Store a new post.
    async fn insert(&self, post: &Micropost) -> Result<(), MicropostPersistenceError>;

    /// Fetch a post by identifier.
    async fn find_by_id(
        &self,
        id: &MicropostId,
    ) -> Result<Option<Micropost>, MicropostPersistenceError>;

    /// Remove a post. Returns `false` when there was none.
    async fn delete(&self, id: &MicropostId) -> Result<bool, MicropostPersistenceError>;

    /// Page through posts by any of `authors`, newest first with ties broken
    /// by identifier descending. `total` counts every matching post.
    async fn list_by_authors(
        &self,
        authors: &[UserId],
        page: &PageRequest,
    ) -> Result<Page<Micropost>, MicropostPersistenceError>;
}
