//! Domain primitives, services and ports.
//!
//! Purpose: define the identity, follow-graph, content and feed model plus
//! the services implementing each use-case port. Nothing in here knows
//! about HTTP or SQL; adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`): use-case failure payload.
//! - User / UserRecord: identity with and without its password digest.
//! - Micropost: a published post.
//! - Viewer / SessionArtifact: the acting party and what it holds.
//! - `*Service` types: the domain implementations of the driving ports.

pub mod auth;
pub mod cascade;
pub mod content_store;
pub mod credentials;
pub mod error;
pub mod feed;
pub mod identity_directory;
pub mod micropost;
pub mod ports;
pub mod relationship_graph;
pub mod session;
pub mod user;
pub mod validation;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::cascade::{CascadeOutcome, CascadePlan, CascadeStep};
pub use self::content_store::ContentStoreService;
pub use self::credentials::{CredentialError, CredentialStore, PasswordDigest, RememberToken};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed::FeedEngineService;
pub use self::identity_directory::IdentityDirectoryService;
pub use self::micropost::{Micropost, MicropostId, MicropostValidationError, PostContent};
pub use self::relationship_graph::{FollowCounts, RelationshipGraphService};
pub use self::session::{SessionArtifact, SessionAuthenticatorService, SignedInUser, Viewer};
pub use self::user::{
    DisplayName, EmailAddress, User, UserId, UserParts, UserRecord, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use micropost::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
