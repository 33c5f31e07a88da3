//! Driving port for identity lifecycle use-cases.
//!
//! Inbound adapters register, edit, list and remove identities through this
//! port without knowing how they are stored.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::validation::{ProfileUpdate, RegistrationRequest};
use crate::domain::{CascadeOutcome, Error, SignedInUser, User, UserId, Viewer};

/// Domain use-case port for identities.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Register a new identity.
    async fn create(&self, request: RegistrationRequest) -> Result<User, Error>;

    /// Edit the viewer's own profile and re-issue their session.
    async fn update(
        &self,
        viewer: &Viewer,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<SignedInUser, Error>;

    /// Look up an identity by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<User, Error>;

    /// Look up an identity by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> Result<User, Error>;

    /// Page through identities in registration order.
    async fn list(&self, page: PageRequest) -> Result<Page<User>, Error>;

    /// Remove an identity with its posts and follow edges. Admins only.
    async fn destroy(&self, viewer: &Viewer, target: UserId) -> Result<CascadeOutcome, Error>;

    /// Grant the admin flag. Admins only.
    async fn promote(&self, viewer: &Viewer, target: UserId) -> Result<User, Error>;
}
