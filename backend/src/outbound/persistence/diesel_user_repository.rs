//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by a unique index on `lower(email)`; the
//! adapter translates that violation into `DuplicateEmail`. Cascading
//! deletion runs every step of the plan inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository, UserUpdate};
use crate::domain::{
    CascadeOutcome, CascadePlan, CascadeStep, DisplayName, EmailAddress, PasswordDigest,
    RememberToken, User, UserId, UserParts, UserRecord,
};

use super::diesel_basic_error_mapping::{
    affected_rows, is_unique_violation, map_basic_diesel_error, map_basic_pool_error, row_count, sql_bound,
};
use super::diesel_micropost_repository::delete_microposts_by;
use super::diesel_relationship_repository::delete_relationships_of;
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Like [`map_diesel_error`] but reports unique violations on `email`.
fn map_write_error(error: diesel::result::Error, email: &EmailAddress) -> UserPersistenceError {
    if is_unique_violation(&error) {
        UserPersistenceError::duplicate_email(email.as_ref())
    } else {
        map_diesel_error(error)
    }
}

fn row_to_record(row: UserRow) -> Result<UserRecord, UserPersistenceError> {
    let id = row.id;
    let invalid = |field: &'static str| {
        move |err| {
            warn!(user_id = %id, field, error = %err, "stored user row failed validation");
            UserPersistenceError::query(format!("stored {field} is invalid"))
        }
    };
    let name = DisplayName::new(row.name).map_err(invalid("name"))?;
    let email = EmailAddress::new(row.email).map_err(invalid("email"))?;
    let user = User::from_parts(UserParts {
        id: UserId::from_uuid(row.id),
        name,
        email,
        admin: row.admin,
        remember_token: RememberToken::from_raw(row.remember_token),
        created_at: row.created_at,
        updated_at: row.updated_at,
    });
    Ok(UserRecord {
        user,
        password_digest: PasswordDigest::from_stored(row.password_digest),
    })
}

async fn delete_user(
    conn: &mut AsyncPgConnection,
    id: &UserId,
) -> Result<u64, diesel::result::Error> {
    let removed = diesel::delete(users::table.find(*id.as_uuid()))
        .execute(conn)
        .await?;
    Ok(affected_rows(removed))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, record: &UserRecord) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &record.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_digest: record.password_digest.as_str(),
            remember_token: user.remember_token().as_str(),
            admin: user.is_admin(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, user.email()))
    }

    async fn update(&self, update: &UserUpdate) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &update.user;
        let changeset = UserProfileChangeset {
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_digest: update.password_digest.as_ref().map(PasswordDigest::as_str),
            remember_token: user.remember_token().as_str(),
            updated_at: user.updated_at(),
        };

        let updated = diesel::update(users::table.find(*user.id().as_uuid()))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, user.email()))?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record)
            .transpose()
            .map(|record| record.map(|r| r.user))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn list(&self, page: &PageRequest) -> Result<Page<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<UserRow> = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .limit(sql_bound(page.limit()))
            .offset(sql_bound(page.offset()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(|row| row_to_record(row).map(|record| record.user))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, *page, row_count(total)))
    }

    async fn store_remember_token(
        &self,
        id: &UserId,
        token: &RememberToken,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*id.as_uuid()))
            .set(users::remember_token.eq(token.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn set_admin(
        &self,
        id: &UserId,
        admin: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(*id.as_uuid()))
            .set((users::admin.eq(admin), users::updated_at.eq(at)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete_cascade(
        &self,
        plan: &CascadePlan,
    ) -> Result<CascadeOutcome, UserPersistenceError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let steps = plan.steps().to_vec();

        conn.transaction(|conn| {
            async move {
                let mut outcome = CascadeOutcome::default();
                for step in &steps {
                    let affected = match step {
                        CascadeStep::DeleteMicropostsBy(id) => delete_microposts_by(conn, id).await?,
                        CascadeStep::DeleteRelationshipsOf(id) => {
                            delete_relationships_of(conn, id).await?
                        }
                        CascadeStep::DeleteUser(id) => delete_user(conn, id).await?,
                    };
                    outcome.record(step, affected);
                }
                Ok::<_, diesel::result::Error>(outcome)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
