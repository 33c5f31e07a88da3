//! Wiring of domain services onto the configured persistence adapters.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use micropost::domain::ports::{MicropostRepository, RelationshipRepository, UserRepository};
use micropost::domain::{
    ContentStoreService, CredentialStore, FeedEngineService, IdentityDirectoryService,
    RelationshipGraphService, SessionAuthenticatorService,
};
use micropost::inbound::http::state::HttpState;
use micropost::outbound::persistence::{
    DieselMicropostRepository, DieselRelationshipRepository, DieselUserRepository, InMemoryStore,
};

use super::ServerConfig;

/// Build every driving port over one set of repositories.
fn wire<U, R, M>(
    users: Arc<U>,
    relationships: Arc<R>,
    posts: Arc<M>,
    credentials: Arc<CredentialStore>,
    max_post_chars: usize,
) -> HttpState
where
    U: UserRepository + 'static,
    R: RelationshipRepository + 'static,
    M: MicropostRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    HttpState {
        identity: Arc::new(IdentityDirectoryService::new(
            Arc::clone(&users),
            Arc::clone(&credentials),
            Arc::clone(&clock),
        )),
        graph: Arc::new(RelationshipGraphService::new(
            Arc::clone(&users),
            Arc::clone(&relationships),
            Arc::clone(&clock),
        )),
        content: Arc::new(
            ContentStoreService::new(Arc::clone(&users), Arc::clone(&posts), clock)
                .with_max_content_chars(max_post_chars),
        ),
        feed: Arc::new(FeedEngineService::new(
            Arc::clone(&users),
            relationships,
            posts,
        )),
        sessions: Arc::new(SessionAuthenticatorService::new(users, credentials)),
    }
}

/// Build the HTTP state: Diesel repositories when a pool is configured,
/// otherwise one shared in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    let credentials = Arc::new(config.credentials.clone());
    match &config.db_pool {
        Some(pool) => wire(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselRelationshipRepository::new(pool.clone())),
            Arc::new(DieselMicropostRepository::new(pool.clone())),
            credentials,
            config.max_post_chars,
        ),
        None => {
            let store = Arc::new(InMemoryStore::new());
            wire(
                Arc::clone(&store),
                Arc::clone(&store),
                store,
                credentials,
                config.max_post_chars,
            )
        }
    }
}
