//! Application settings loaded via OrthoConfig, and the server
//! configuration derived from them.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use micropost::domain::CredentialStore;
use micropost::domain::micropost::DEFAULT_MAX_CONTENT_CHARS;
use micropost::outbound::persistence::{DbPool, PoolConfig};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Settings read from `MICROPOST_*` environment variables, configuration
/// files and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MICROPOST")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one, state lives in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub db_connect_timeout_secs: Option<u64>,
    /// bcrypt work factor.
    pub bcrypt_cost: Option<u32>,
    /// Longest accepted post, in characters.
    pub max_post_chars: Option<usize>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: Option<bool>,
    /// Fall back to a random session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session_key: bool,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR).parse()
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST)
    }

    pub fn max_post_chars(&self) -> usize {
        self.max_post_chars.unwrap_or(DEFAULT_MAX_CONTENT_CHARS)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    pub fn pool_config(&self, database_url: &str) -> PoolConfig {
        let timeout = self
            .db_connect_timeout_secs
            .unwrap_or(DEFAULT_DB_CONNECT_TIMEOUT_SECS);
        PoolConfig::new(database_url)
            .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS))
            .with_connection_timeout(Duration::from_secs(timeout))
    }
}

/// Everything the HTTP server needs once settings have been resolved.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) credentials: CredentialStore,
    pub(crate) max_post_chars: usize,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        key: Key,
        bind_addr: SocketAddr,
        credentials: CredentialStore,
        max_post_chars: usize,
    ) -> Self {
        Self {
            key,
            cookie_secure: true,
            same_site: SameSite::Lax,
            bind_addr,
            credentials,
            max_post_chars,
            db_pool: None,
        }
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, cookie_secure: bool) -> Self {
        self.cookie_secure = cookie_secure;
        self
    }

    /// Persist through PostgreSQL instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
