//! Short posts authored by users.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Default upper bound on post length, in characters.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 140;

/// Validation errors for micropost fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicropostValidationError {
    InvalidId,
    EmptyContent,
    ContentTooLong { max: usize },
}

impl fmt::Display for MicropostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "micropost id must be a valid UUID"),
            Self::EmptyContent => write!(f, "content can't be blank"),
            Self::ContentTooLong { max } => {
                write!(f, "content is too long (maximum is {max} characters)")
            }
        }
    }
}

impl std::error::Error for MicropostValidationError {}

/// Post identifier. Version 7 UUIDs, so later posts sort after earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MicropostId(Uuid);

impl MicropostId {
    /// Parse an identifier from its hyphenated string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, MicropostValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| MicropostValidationError::InvalidId)
    }

    /// Mint an identifier for a post created now.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MicropostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<MicropostId> for String {
    fn from(value: MicropostId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for MicropostId {
    type Error = MicropostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Post body.
///
/// ## Invariants
/// - Non-blank once trimmed.
/// - At most the configured number of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    /// Validate `content` against a maximum length.
    ///
    /// # Examples
    /// ```
    /// use micropost::domain::PostContent;
    ///
    /// assert!(PostContent::new("Lorem ipsum", 140).is_ok());
    /// assert!(PostContent::new("a".repeat(141), 140).is_err());
    /// ```
    pub fn new(content: impl Into<String>, max_chars: usize) -> Result<Self, MicropostValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(MicropostValidationError::EmptyContent);
        }
        if content.chars().count() > max_chars {
            return Err(MicropostValidationError::ContentTooLong { max: max_chars });
        }
        Ok(Self(content))
    }

    /// Wrap content read back from storage, where it was validated on write.
    pub fn from_stored(content: impl Into<String>) -> Self {
        Self(content.into())
    }
}

impl AsRef<str> for PostContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PostContent> for String {
    fn from(value: PostContent) -> Self {
        value.0
    }
}

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Micropost {
    id: MicropostId,
    author_id: UserId,
    content: PostContent,
    created_at: DateTime<Utc>,
}

impl Micropost {
    pub fn new(
        id: MicropostId,
        author_id: UserId,
        content: PostContent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author_id,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> MicropostId {
        self.id
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    pub fn content(&self) -> &PostContent {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Key giving newest-first order when sorted descending.
    pub fn recency_key(&self) -> (DateTime<Utc>, MicropostId) {
        (self.created_at, self.id)
    }
}

/// Sort newest first, breaking timestamp ties by identifier descending.
pub fn sort_newest_first(posts: &mut [Micropost]) {
    posts.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
}
