//! Port abstraction for identity persistence adapters and their errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::validation::ValidationErrors;
use crate::domain::{
    CascadeOutcome, CascadePlan, EmailAddress, Error, PasswordDigest, RememberToken, User,
    UserId, UserRecord,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}"
            as Error::service_unavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}"
            as Error::internal,
        /// Another identity already uses the address.
        DuplicateEmail { email: String } => "email already registered: {email}"
            as |_| Error::from(ValidationErrors::email_taken()),
    }
}

/// Replacement profile for an existing identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    /// Profile fields, remember token and `updated_at` to store.
    pub user: User,
    /// New digest, or `None` to keep the stored one.
    pub password_digest: Option<PasswordDigest>,
}

/// Storage for identities and their credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new identity. Fails with `DuplicateEmail` when the address is
    /// already registered, compared case-insensitively.
    async fn insert(&self, record: &UserRecord) -> Result<(), UserPersistenceError>;

    /// Overwrite an identity's profile. Returns `false` when it no longer exists.
    async fn update(&self, update: &UserUpdate) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and digest by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, UserPersistenceError>;

    /// Page through identities ordered by `(created_at, id)` ascending.
    async fn list(&self, page: &PageRequest) -> Result<Page<User>, UserPersistenceError>;

    /// Replace the stored remember token. Returns `false` when the user is gone.
    async fn store_remember_token(
        &self,
        id: &UserId,
        token: &RememberToken,
    ) -> Result<bool, UserPersistenceError>;

    /// Set the admin flag. Returns `false` when the user is gone.
    async fn set_admin(
        &self,
        id: &UserId,
        admin: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError>;

    /// Run every step of `plan` atomically.
    async fn delete_cascade(
        &self,
        plan: &CascadePlan,
    ) -> Result<CascadeOutcome, UserPersistenceError>;
}

#[cfg(test)]
mod tests {
    //! Translation of adapter failures into domain errors.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[case(UserPersistenceError::duplicate_email("a@b.co"), ErrorCode::InvalidRequest)]
    fn maps_to_domain_codes(#[case] error: UserPersistenceError, #[case] code: ErrorCode) {
        assert_eq!(Error::from(error).code(), code);
    }

    #[rstest]
    fn duplicate_email_surfaces_as_a_taken_field() {
        let error = Error::from(UserPersistenceError::duplicate_email("a@b.co"));
        assert_eq!(error.field_names(), ["email"]);
        let details = error.details().expect("field details");
        assert_eq!(details["fields"][0]["code"], "taken");
    }
}
