//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered identities with their credentials.
    users (id) {
        /// Primary key: UUID v4 identifier, also the password salt.
        id -> Uuid,
        /// Display name (max 50 characters).
        name -> Varchar,
        /// Lower-cased login address, unique.
        email -> Varchar,
        /// bcrypt digest of the password.
        password_digest -> Varchar,
        /// Current remember token.
        remember_token -> Varchar,
        admin -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges.
    relationships (follower_id, followed_id) {
        follower_id -> Uuid,
        followed_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Published posts.
    microposts (id) {
        /// Primary key: UUID v7 identifier.
        id -> Uuid,
        author_id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(microposts -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(microposts, relationships, users);
