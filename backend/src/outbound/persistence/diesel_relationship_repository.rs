//! PostgreSQL-backed `RelationshipRepository` implementation using Diesel ORM.
//!
//! Edges reference `users` with `ON DELETE CASCADE`, and a check constraint
//! forbids self-edges. Duplicate follows are absorbed by `ON CONFLICT DO
//! NOTHING`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{RelationshipPersistenceError, RelationshipRepository};
use crate::domain::{FollowCounts, UserId};

use super::diesel_basic_error_mapping::{
    affected_rows, map_basic_diesel_error, map_basic_pool_error, row_count,
};
use super::models::NewRelationshipRow;
use super::pool::{DbPool, PoolError};
use super::schema::relationships;

/// Diesel-backed implementation of the `RelationshipRepository` port.
#[derive(Clone)]
pub struct DieselRelationshipRepository {
    pool: DbPool,
}

impl DieselRelationshipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RelationshipPersistenceError {
    map_basic_pool_error(error, RelationshipPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RelationshipPersistenceError {
    map_basic_diesel_error(
        error,
        RelationshipPersistenceError::query,
        RelationshipPersistenceError::connection,
    )
}

fn to_user_ids(ids: Vec<Uuid>) -> Vec<UserId> {
    ids.into_iter().map(UserId::from_uuid).collect()
}

/// Remove every edge touching `id`. Shared with the user cascade.
pub(super) async fn delete_relationships_of(
    conn: &mut AsyncPgConnection,
    id: &UserId,
) -> Result<u64, diesel::result::Error> {
    let uuid = *id.as_uuid();
    let removed = diesel::delete(
        relationships::table.filter(
            relationships::follower_id
                .eq(uuid)
                .or(relationships::followed_id.eq(uuid)),
        ),
    )
    .execute(conn)
    .await?;
    Ok(affected_rows(removed))
}

#[async_trait]
impl RelationshipRepository for DieselRelationshipRepository {
    async fn insert(
        &self,
        follower: &UserId,
        followed: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRelationshipRow {
            follower_id: *follower.as_uuid(),
            followed_id: *followed.as_uuid(),
            created_at: at,
        };

        let inserted = diesel::insert_into(relationships::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn delete(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            relationships::table.find((*follower.as_uuid(), *followed.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn exists(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            relationships::table.find((*follower.as_uuid(), *followed.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn following(&self, id: &UserId) -> Result<Vec<UserId>, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = relationships::table
            .filter(relationships::follower_id.eq(*id.as_uuid()))
            .select(relationships::followed_id)
            .order(relationships::followed_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_user_ids(ids))
    }

    async fn followers(&self, id: &UserId) -> Result<Vec<UserId>, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = relationships::table
            .filter(relationships::followed_id.eq(*id.as_uuid()))
            .select(relationships::follower_id)
            .order(relationships::follower_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_user_ids(ids))
    }

    async fn counts(&self, id: &UserId) -> Result<FollowCounts, RelationshipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuid = *id.as_uuid();
        let following: i64 = relationships::table
            .filter(relationships::follower_id.eq(uuid))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let followers: i64 = relationships::table
            .filter(relationships::followed_id.eq(uuid))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(FollowCounts {
            following: row_count(following),
            followers: row_count(followers),
        })
    }
}
