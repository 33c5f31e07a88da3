//! Identity data model.
//!
//! [`User`] is the public view of an identity; [`UserRecord`] pairs it with
//! the password digest for the storage and authentication paths only.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::{PasswordDigest, RememberToken};

/// Validation errors for identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    EmptyName,
    NameTooLong { max: usize },
    EmptyEmail,
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "name can't be blank"),
            Self::NameTooLong { max } => {
                write!(f, "name is too long (maximum is {max} characters)")
            }
            Self::EmptyEmail => write!(f, "email can't be blank"),
            Self::InvalidEmail => write!(f, "email is invalid"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its hyphenated string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The all-zero identifier. Never assigned to a stored user.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Wrap an identifier read back from storage.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name, in characters.
pub const DISPLAY_NAME_MAX: usize = 50;

/// Human readable name shown next to posts and on profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_+\-.]+@[A-Za-z0-9\-.]+\.[A-Za-z]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Login address, stored lower-cased.
///
/// ## Invariants
/// - ASCII only: letters, digits and `_+-.` before the `@`, a dotted domain
///   after it, ending in a letters-only label.
/// - Always lower-case, so equality is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email.to_ascii_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Registered identity.
///
/// Carries the current remember token so session lookups can compare it,
/// but never the password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: DisplayName,
    email: EmailAddress,
    admin: bool,
    remember_token: RememberToken,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Field bundle for [`User::from_parts`].
#[derive(Debug, Clone)]
pub struct UserParts {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub admin: bool,
    pub remember_token: RememberToken,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Reassemble a user from validated parts.
    pub fn from_parts(parts: UserParts) -> Self {
        let UserParts {
            id,
            name,
            email,
            admin,
            remember_token,
            created_at,
            updated_at,
        } = parts;
        Self {
            id,
            name,
            email,
            admin,
            remember_token,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn remember_token(&self) -> &RememberToken {
        &self.remember_token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Copy with the profile fields replaced.
    pub fn with_profile(mut self, name: DisplayName, email: EmailAddress, at: DateTime<Utc>) -> Self {
        self.name = name;
        self.email = email;
        self.updated_at = at;
        self
    }

    /// Copy carrying a rotated remember token.
    pub fn with_remember_token(mut self, token: RememberToken) -> Self {
        self.remember_token = token;
        self
    }

    /// Copy with the admin flag set to `admin`.
    pub fn with_admin(mut self, admin: bool, at: DateTime<Utc>) -> Self {
        self.admin = admin;
        self.updated_at = at;
        self
    }
}

/// A [`User`] together with its stored password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: User,
    pub password_digest: PasswordDigest,
}
