//! Driving port for sign-in and session resolution.
//!
//! Inbound adapters turn a stored [`SessionArtifact`] back into a
//! [`Viewer`](crate::domain::Viewer) through this port on every request.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, SessionArtifact, User, Viewer};

/// Domain use-case port for authentication.
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    /// Check credentials. Unknown emails and wrong passwords fail alike.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Rotate the user's remember token and return the new artifact.
    async fn sign_in(&self, user: &User) -> Result<SessionArtifact, Error>;

    /// Resolve an artifact to its user, or `None` when it is stale.
    async fn current_identity(&self, artifact: &SessionArtifact) -> Result<Option<User>, Error>;

    /// Invalidate every artifact issued to the viewer.
    async fn sign_out(&self, viewer: &Viewer) -> Result<(), Error>;
}
