//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{microposts, relationships, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub remember_token: String,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_digest: &'a str,
    pub remember_token: &'a str,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for profile edits. A `None` digest leaves the column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileChangeset<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_digest: Option<&'a str>,
    pub remember_token: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for follow edges.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = relationships)]
pub(crate) struct NewRelationshipRow {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the microposts table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = microposts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MicropostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
