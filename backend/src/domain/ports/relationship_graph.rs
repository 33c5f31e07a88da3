//! Driving port for follow/unfollow use-cases.

use async_trait::async_trait;

use crate::domain::{Error, FollowCounts, UserId, Viewer};

/// Domain use-case port for the follow graph.
#[async_trait]
pub trait RelationshipGraph: Send + Sync {
    /// Make the viewer follow `followed`. Following twice is a no-op.
    async fn follow(&self, viewer: &Viewer, followed: UserId) -> Result<(), Error>;

    /// Make the viewer stop following `followed`. Unfollowing twice is a no-op.
    async fn unfollow(&self, viewer: &Viewer, followed: UserId) -> Result<(), Error>;

    /// Users followed by `id`.
    async fn following(&self, id: UserId) -> Result<Vec<UserId>, Error>;

    /// Users following `id`.
    async fn followers(&self, id: UserId) -> Result<Vec<UserId>, Error>;

    /// Whether `follower` follows `followed`.
    async fn is_following(&self, follower: UserId, followed: UserId) -> Result<bool, Error>;

    /// Edge counts for a profile.
    async fn counts(&self, id: UserId) -> Result<FollowCounts, Error>;
}
