//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie carries a [`SessionArtifact`]: the user id and the remember
//! token issued at sign-in. Each request turns it back into a [`Viewer`]
//! through the session authenticator, so a rotated token signs the client
//! out on its next request.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::SessionAuthenticator;
use crate::domain::{Error, RememberToken, SessionArtifact, UserId, Viewer};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const REMEMBER_TOKEN_KEY: &str = "remember_token";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store `artifact` in the cookie, replacing whatever was there.
    pub fn persist(&self, artifact: &SessionArtifact) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, artifact.user_id().to_string())
            .and_then(|()| {
                self.0
                    .insert(REMEMBER_TOKEN_KEY, artifact.remember_token().as_str())
            })
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Artifact held by the client, if the cookie carries a well-formed one.
    pub fn artifact(&self) -> Result<Option<SessionArtifact>, Error> {
        let read = |key| {
            self.0
                .get::<String>(key)
                .map_err(|error| Error::internal(format!("failed to read session: {error}")))
        };
        let (Some(raw_id), Some(token)) = (read(USER_ID_KEY)?, read(REMEMBER_TOKEN_KEY)?) else {
            return Ok(None);
        };
        match UserId::new(raw_id) {
            Ok(id) => Ok(Some(SessionArtifact::new(id, RememberToken::from_raw(token)))),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                Ok(None)
            }
        }
    }

    /// Resolve the acting party. A stale or malformed cookie is cleared and
    /// treated as anonymous.
    pub async fn viewer(&self, sessions: &dyn SessionAuthenticator) -> Result<Viewer, Error> {
        let Some(artifact) = self.artifact()? else {
            return Ok(Viewer::Anonymous);
        };
        match sessions.current_identity(&artifact).await? {
            Some(user) => Ok(Viewer::Authenticated(user)),
            None => {
                self.clear();
                Ok(Viewer::Anonymous)
            }
        }
    }

    /// Drop every key from the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
