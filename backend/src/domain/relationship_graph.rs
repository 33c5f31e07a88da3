//! Directed follow graph between identities.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde::Serialize;
use tracing::info;

use super::ports::{RelationshipGraph, RelationshipRepository, UserRepository};
use super::{Error, UserId, Viewer};

/// Number of edges on each side of an identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCounts {
    pub following: u64,
    pub followers: u64,
}

/// Relationship graph backed by user and relationship repositories.
#[derive(Clone)]
pub struct RelationshipGraphService<U, R> {
    users: Arc<U>,
    relationships: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<U, R> RelationshipGraphService<U, R> {
    /// Create a new graph service.
    pub fn new(users: Arc<U>, relationships: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            relationships,
            clock,
        }
    }
}

impl<U, R> RelationshipGraphService<U, R>
where
    U: UserRepository,
    R: RelationshipRepository,
{
    async fn ensure_exists(&self, id: UserId) -> Result<(), Error> {
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

    /// Signed-in follower for an edge mutation towards `followed`.
    async fn edge_endpoints(&self, viewer: &Viewer, followed: UserId) -> Result<UserId, Error> {
        let follower = viewer.require_user()?.id();
        if follower == followed {
            return Err(Error::invalid_request("users cannot follow themselves"));
        }
        self.ensure_exists(follower).await?;
        self.ensure_exists(followed).await?;
        Ok(follower)
    }
}

#[async_trait]
impl<U, R> RelationshipGraph for RelationshipGraphService<U, R>
where
    U: UserRepository,
    R: RelationshipRepository,
{
    async fn follow(&self, viewer: &Viewer, followed: UserId) -> Result<(), Error> {
        let follower = self.edge_endpoints(viewer, followed).await?;
        let created = self
            .relationships
            .insert(&follower, &followed, self.clock.utc())
            .await
            .map_err(Error::from)?;
        if created {
            info!(follower_id = %follower, followed_id = %followed, "followed");
        }
        Ok(())
    }

    async fn unfollow(&self, viewer: &Viewer, followed: UserId) -> Result<(), Error> {
        let follower = self.edge_endpoints(viewer, followed).await?;
        let removed = self
            .relationships
            .delete(&follower, &followed)
            .await
            .map_err(Error::from)?;
        if removed {
            info!(follower_id = %follower, followed_id = %followed, "unfollowed");
        }
        Ok(())
    }

    async fn following(&self, id: UserId) -> Result<Vec<UserId>, Error> {
        self.ensure_exists(id).await?;
        let mut ids = self
            .relationships
            .following(&id)
            .await
            .map_err(Error::from)?;
        ids.sort_unstable();
        Ok(ids)
    }

    async fn followers(&self, id: UserId) -> Result<Vec<UserId>, Error> {
        self.ensure_exists(id).await?;
        let mut ids = self
            .relationships
            .followers(&id)
            .await
            .map_err(Error::from)?;
        ids.sort_unstable();
        Ok(ids)
    }

    async fn is_following(&self, follower: UserId, followed: UserId) -> Result<bool, Error> {
        self.relationships
            .exists(&follower, &followed)
            .await
            .map_err(Error::from)
    }

    async fn counts(&self, id: UserId) -> Result<FollowCounts, Error> {
        self.ensure_exists(id).await?;
        self.relationships
            .counts(&id)
            .await
            .map_err(Error::from)
    }
}
