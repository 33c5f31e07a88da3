//! Port abstraction for follow-edge persistence.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, FollowCounts, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by relationship repository adapters.
    pub enum RelationshipPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "relationship repository connection failed: {message}"
            as Error::service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "relationship repository query failed: {message}"
            as Error::internal,
    }
}

/// Storage for directed `(follower, followed)` edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    /// Add an edge. Returns `false` when it already existed.
    async fn insert(
        &self,
        follower: &UserId,
        followed: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool, RelationshipPersistenceError>;

    /// Remove an edge. Returns `false` when there was none.
    async fn delete(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError>;

    /// Whether `follower` follows `followed`.
    async fn exists(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError>;

    /// Users followed by `id`, in identifier order.
    async fn following(&self, id: &UserId) -> Result<Vec<UserId>, RelationshipPersistenceError>;

    /// Users following `id`, in identifier order.
    async fn followers(&self, id: &UserId) -> Result<Vec<UserId>, RelationshipPersistenceError>;

    /// Edge counts in both directions.
    async fn counts(&self, id: &UserId) -> Result<FollowCounts, RelationshipPersistenceError>;
}
