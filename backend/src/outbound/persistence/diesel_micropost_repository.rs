//! PostgreSQL-backed `MicropostRepository` implementation using Diesel ORM.
//!
//! Feed and profile listings are served by the `(author_id, created_at DESC,
//! id DESC)` index; ordering matches [`sort_newest_first`].
//!
//! [`sort_newest_first`]: crate::domain::micropost::sort_newest_first

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{MicropostPersistenceError, MicropostRepository};
use crate::domain::{Micropost, MicropostId, PostContent, UserId};

use super::diesel_basic_error_mapping::{
    affected_rows, map_basic_diesel_error, map_basic_pool_error, row_count, sql_bound,
};
use super::models::MicropostRow;
use super::pool::{DbPool, PoolError};
use super::schema::microposts;

/// Diesel-backed implementation of the `MicropostRepository` port.
#[derive(Clone)]
pub struct DieselMicropostRepository {
    pool: DbPool,
}

impl DieselMicropostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MicropostPersistenceError {
    map_basic_pool_error(error, MicropostPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MicropostPersistenceError {
    map_basic_diesel_error(
        error,
        MicropostPersistenceError::query,
        MicropostPersistenceError::connection,
    )
}

fn row_to_micropost(row: MicropostRow) -> Micropost {
    Micropost::new(
        MicropostId::from_uuid(row.id),
        UserId::from_uuid(row.author_id),
        PostContent::from_stored(row.content),
        row.created_at,
    )
}

fn micropost_to_row(post: &Micropost) -> MicropostRow {
    MicropostRow {
        id: *post.id().as_uuid(),
        author_id: *post.author_id().as_uuid(),
        content: post.content().as_ref().to_owned(),
        created_at: post.created_at(),
    }
}

/// Remove every post by `author`. Shared with the user cascade.
pub(super) async fn delete_microposts_by(
    conn: &mut AsyncPgConnection,
    author: &UserId,
) -> Result<u64, diesel::result::Error> {
    let removed = diesel::delete(microposts::table.filter(microposts::author_id.eq(*author.as_uuid())))
        .execute(conn)
        .await?;
    Ok(affected_rows(removed))
}

#[async_trait]
impl MicropostRepository for DieselMicropostRepository {
    async fn insert(&self, post: &Micropost) -> Result<(), MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(microposts::table)
            .values(&micropost_to_row(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &MicropostId,
    ) -> Result<Option<Micropost>, MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = microposts::table
            .find(*id.as_uuid())
            .select(MicropostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_micropost))
    }

    async fn delete(&self, id: &MicropostId) -> Result<bool, MicropostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(microposts::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_by_authors(
        &self,
        authors: &[UserId],
        page: &PageRequest,
    ) -> Result<Page<Micropost>, MicropostPersistenceError> {
        if authors.is_empty() {
            return Ok(Page::empty(*page));
        }
        let author_ids: Vec<Uuid> = authors.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = microposts::table
            .filter(microposts::author_id.eq_any(author_ids.clone()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<MicropostRow> = microposts::table
            .filter(microposts::author_id.eq_any(author_ids))
            .order((microposts::created_at.desc(), microposts::id.desc()))
            .limit(sql_bound(page.limit()))
            .offset(sql_bound(page.offset()))
            .select(MicropostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows.into_iter().map(row_to_micropost).collect();
        Ok(Page::new(items, *page, row_count(total)))
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage for this adapter.
    use super::*;
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    #[rstest]
    fn rows_and_posts_carry_the_same_fields() {
        let post = Micropost::new(
            MicropostId::generate(),
            UserId::random(),
            PostContent::from_stored("hello"),
            DateTime::<Utc>::UNIX_EPOCH,
        );

        let row = micropost_to_row(&post);
        assert_eq!(row.content, "hello");
        assert_eq!(row_to_micropost(row), post);
    }
}
