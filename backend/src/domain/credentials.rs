//! Password digests and remember tokens.
//!
//! Digests are bcrypt hashes whose 16-byte salt is the owning record's UUID,
//! so two users choosing the same password end up with different digests.
//! Verification recomputes the digest with the record's salt and compares the
//! encoded strings in constant time.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore as _;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq as _;

use super::{Error, UserId};

/// Number of random bytes behind every remember token.
pub const REMEMBER_TOKEN_BYTES: usize = 32;

/// Errors raised while deriving a password digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The configured bcrypt work factor is outside the supported range.
    #[error("bcrypt cost {cost} is outside {min}..={max}")]
    InvalidCost {
        /// Rejected cost.
        cost: u32,
        /// Smallest accepted cost.
        min: u32,
        /// Largest accepted cost.
        max: u32,
    },
    /// The hashing primitive failed.
    #[error("password hashing failed: {message}")]
    Hashing {
        /// Description from the hashing library.
        message: String,
    },
}

/// Encoded bcrypt digest (`$2b$<cost>$<salt+hash>`).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest read back from storage. No validation is performed;
    /// a malformed digest simply never verifies.
    pub fn from_stored(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded digest for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn cost(&self) -> Option<u32> {
        let mut parts = self.0.split('$');
        let leading = parts.next()?;
        let version = parts.next()?;
        let cost = parts.next()?;
        if !leading.is_empty() || version.is_empty() {
            return None;
        }
        cost.parse().ok()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Opaque long-lived session token.
///
/// ## Invariants
/// - Freshly generated tokens are 43 URL-safe base64 characters.
#[derive(Clone, PartialEq, Eq)]
pub struct RememberToken(String);

impl RememberToken {
    /// Wrap a token read back from storage or presented by a client.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Encoded token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Compare against a presented token without short-circuiting on the
    /// first differing byte.
    pub fn matches(&self, presented: &RememberToken) -> bool {
        !self.0.is_empty() && constant_time_eq(self.0.as_bytes(), presented.0.as_bytes())
    }
}

impl fmt::Debug for RememberToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RememberToken(<redacted>)")
    }
}

/// Byte comparison whose running time depends only on the input lengths.
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.ct_eq(right).into()
}

/// Hashes and verifies passwords, and mints remember tokens.
///
/// # Examples
/// ```
/// use micropost::domain::{CredentialStore, UserId};
///
/// let store = CredentialStore::new(4).expect("cost 4 is valid");
/// let salt = UserId::random();
/// let digest = store.hash("foobar", &salt).expect("hashes");
/// assert!(store.verify("foobar", &salt, &digest));
/// assert!(!store.verify("barfoo", &salt, &digest));
/// ```
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cost: u32,
    dummy: PasswordDigest,
}

impl CredentialStore {
    /// Smallest bcrypt cost accepted.
    pub const MIN_COST: u32 = 4;
    /// Largest bcrypt cost accepted.
    pub const MAX_COST: u32 = 31;

    /// Build a store hashing with `cost`.
    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        if !(Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            return Err(CredentialError::InvalidCost {
                cost,
                min: Self::MIN_COST,
                max: Self::MAX_COST,
            });
        }
        let dummy = hash_with(cost, "dummy password", UserId::nil().as_uuid().into_bytes())?;
        Ok(Self { cost, dummy })
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Derive the digest of `plaintext` salted with the record identifier.
    pub fn hash(&self, plaintext: &str, salt: &UserId) -> Result<PasswordDigest, CredentialError> {
        hash_with(self.cost, plaintext, salt.as_uuid().into_bytes())
    }

    /// Check `plaintext` against a stored digest.
    ///
    /// Returns `false` for malformed digests and for digests derived with a
    /// different salt.
    pub fn verify(&self, plaintext: &str, salt: &UserId, digest: &PasswordDigest) -> bool {
        let Some(cost) = digest.cost() else {
            return false;
        };
        match hash_with(cost, plaintext, salt.as_uuid().into_bytes()) {
            Ok(candidate) => constant_time_eq(candidate.0.as_bytes(), digest.0.as_bytes()),
            Err(_) => false,
        }
    }

    /// Run a verification against a throwaway digest so unknown accounts
    /// cost roughly as much as known ones.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &UserId::nil(), &self.dummy);
    }

    /// Mint a fresh remember token from the operating system RNG.
    pub fn generate_token(&self) -> RememberToken {
        let mut bytes = [0_u8; REMEMBER_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        RememberToken(URL_SAFE_NO_PAD.encode(bytes))
    }
}

/// Run CPU-bound credential work on the blocking pool.
pub(crate) async fn off_thread<F, T>(work: F) -> Result<T, Error>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|error| Error::internal(format!("credential worker failed: {error}")))
}

fn hash_with(cost: u32, plaintext: &str, salt: [u8; 16]) -> Result<PasswordDigest, CredentialError> {
    bcrypt::hash_with_salt(plaintext, cost, salt)
        .map(|parts| PasswordDigest(parts.to_string()))
        .map_err(|error| CredentialError::Hashing {
            message: error.to_string(),
        })
}
