//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;

use crate::inbound::http::state::HttpState;
use crate::test_support::InMemoryServices;

/// Session middleware with a fresh key, cookie name `session` and the
/// `Secure` flag off for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `response`.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// HTTP state backed by `services`.
pub fn http_state(services: &InMemoryServices) -> HttpState {
    HttpState {
        identity: Arc::clone(&services.identity) as _,
        graph: Arc::clone(&services.graph) as _,
        content: Arc::clone(&services.content) as _,
        feed: Arc::clone(&services.feed) as _,
        sessions: Arc::clone(&services.sessions) as _,
    }
}
