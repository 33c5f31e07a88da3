//! Persistence adapters for the driven ports.
//!
//! [`InMemoryStore`] keeps everything in process and backs tests and
//! database-less deployments. The Diesel repositories persist to PostgreSQL
//! through a shared [`DbPool`]; row structs and the schema stay private to
//! this module.
//!
//! # Example
//!
//! ```ignore
//! use micropost::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/micropost")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_micropost_repository;
mod diesel_relationship_repository;
mod diesel_user_repository;
mod memory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_micropost_repository::DieselMicropostRepository;
pub use diesel_relationship_repository::DieselRelationshipRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use memory::InMemoryStore;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
