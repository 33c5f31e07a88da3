//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters.
//! Driving ports are implemented by the domain services and called by
//! inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod content_store;
mod feed_engine;
mod identity_directory;
mod micropost_repository;
mod relationship_graph;
mod relationship_repository;
mod session_authenticator;
mod user_repository;

pub use content_store::ContentStore;
pub use feed_engine::FeedEngine;
pub use identity_directory::IdentityDirectory;
#[cfg(test)]
pub use micropost_repository::MockMicropostRepository;
pub use micropost_repository::{MicropostPersistenceError, MicropostRepository};
pub use relationship_graph::RelationshipGraph;
#[cfg(test)]
pub use relationship_repository::MockRelationshipRepository;
pub use relationship_repository::{RelationshipPersistenceError, RelationshipRepository};
pub use session_authenticator::SessionAuthenticator;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository, UserUpdate};
