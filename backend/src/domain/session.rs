//! Session authentication: sign-in, per-request identity and sign-out.
//!
//! A session artifact is the pair `(user_id, remember_token)`. It resolves
//! to a user only while the token matches the one stored on the record, so
//! rotating the stored token signs out every holder of the old artifact.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::credentials::off_thread;
use super::ports::{SessionAuthenticator, UserRepository};
use super::{CredentialStore, EmailAddress, Error, LoginCredentials, RememberToken, User, UserId};

const INVALID_LOGIN: &str = "invalid email or password";

/// The acting party of a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Viewer {
    /// No session, or one that no longer resolves.
    #[default]
    Anonymous,
    /// A session whose token matches the stored one.
    Authenticated(User),
}

impl Viewer {
    /// Signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// Signed-in user, or [`ErrorCode::Unauthorized`](super::ErrorCode).
    pub fn require_user(&self) -> Result<&User, Error> {
        self.user()
            .ok_or_else(|| Error::unauthorized("sign in required"))
    }

    /// Signed-in administrator, or `Unauthorized`/`Forbidden`.
    pub fn require_admin(&self) -> Result<&User, Error> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(Error::forbidden("administrator privileges required"))
        }
    }
}

/// What a client holds between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionArtifact {
    user_id: UserId,
    remember_token: RememberToken,
}

impl SessionArtifact {
    /// Pair a user id with the token issued to it.
    pub fn new(user_id: UserId, remember_token: RememberToken) -> Self {
        Self {
            user_id,
            remember_token,
        }
    }

    /// Identity the artifact claims.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Token compared against the one stored on the record.
    pub fn remember_token(&self) -> &RememberToken {
        &self.remember_token
    }
}

/// A user together with the artifact that now identifies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    /// User as stored after the token rotation.
    pub user: User,
    /// Artifact to hand back to the client.
    pub session: SessionArtifact,
}

/// Session authenticator backed by a [`UserRepository`].
#[derive(Clone)]
pub struct SessionAuthenticatorService<U> {
    users: Arc<U>,
    credentials: Arc<CredentialStore>,
}

impl<U> SessionAuthenticatorService<U> {
    /// Create a new authenticator.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use micropost::domain::{CredentialStore, SessionAuthenticatorService};
    /// # use micropost::outbound::persistence::InMemoryStore;
    /// let credentials = Arc::new(CredentialStore::new(4).expect("valid cost"));
    /// let service = SessionAuthenticatorService::new(Arc::new(InMemoryStore::default()), credentials);
    /// # let _ = service;
    /// ```
    pub fn new(users: Arc<U>, credentials: Arc<CredentialStore>) -> Self {
        Self { users, credentials }
    }
}

impl<U> SessionAuthenticatorService<U>
where
    U: UserRepository,
{
    async fn rotate_token(&self, id: UserId) -> Result<RememberToken, Error> {
        let token = self.credentials.generate_token();
        let stored = self
            .users
            .store_remember_token(&id, &token)
            .await
            .map_err(Error::from)?;
        if stored {
            Ok(token)
        } else {
            Err(Error::not_found("user not found"))
        }
    }

    async fn reject_unknown(&self, password: Zeroizing<String>) -> Error {
        let credentials = Arc::clone(&self.credentials);
        let _ = off_thread(move || credentials.verify_dummy(&password)).await;
        Error::unauthorized(INVALID_LOGIN)
    }
}

#[async_trait]
impl<U> SessionAuthenticator for SessionAuthenticatorService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let password = Zeroizing::new(credentials.password().to_owned());
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            return Err(self.reject_unknown(password).await);
        };
        let record = self
            .users
            .find_by_email(&email)
            .await
            .map_err(Error::from)?;
        let Some(record) = record else {
            info!(outcome = "unknown_email", "login rejected");
            return Err(self.reject_unknown(password).await);
        };

        let store = Arc::clone(&self.credentials);
        let id = record.user.id();
        let digest = record.password_digest.clone();
        let verified = off_thread(move || store.verify(&password, &id, &digest)).await?;
        if verified {
            Ok(record.user)
        } else {
            info!(user_id = %id, outcome = "wrong_password", "login rejected");
            Err(Error::unauthorized(INVALID_LOGIN))
        }
    }

    async fn sign_in(&self, user: &User) -> Result<SessionArtifact, Error> {
        let token = self.rotate_token(user.id()).await?;
        info!(user_id = %user.id(), "signed in");
        Ok(SessionArtifact::new(user.id(), token))
    }

    async fn current_identity(&self, artifact: &SessionArtifact) -> Result<Option<User>, Error> {
        let user = self
            .users
            .find_by_id(&artifact.user_id())
            .await
            .map_err(Error::from)?;
        match user {
            Some(user) if user.remember_token().matches(artifact.remember_token()) => Ok(Some(user)),
            Some(_) => {
                warn!(user_id = %artifact.user_id(), "stale remember token");
                Ok(None)
            }
            None => {
                warn!(user_id = %artifact.user_id(), "session refers to a missing user");
                Ok(None)
            }
        }
    }

    async fn sign_out(&self, viewer: &Viewer) -> Result<(), Error> {
        let Some(user) = viewer.user() else {
            return Ok(());
        };
        match self.rotate_token(user.id()).await {
            Ok(_) => {
                info!(user_id = %user.id(), "signed out");
                Ok(())
            }
            // Already deleted; nothing left to invalidate.
            Err(error) if error.code() == super::ErrorCode::NotFound => Ok(()),
            Err(error) => Err(error),
        }
    }
}
