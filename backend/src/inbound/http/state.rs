//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only depend on
//! the driving ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ContentStore, FeedEngine, IdentityDirectory, RelationshipGraph, SessionAuthenticator,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityDirectory>,
    pub graph: Arc<dyn RelationshipGraph>,
    pub content: Arc<dyn ContentStore>,
    pub feed: Arc<dyn FeedEngine>,
    pub sessions: Arc<dyn SessionAuthenticator>,
}
