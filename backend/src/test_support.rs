//! Test utilities for the micropost crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityDirectory, UserRepository};
use crate::domain::validation::RegistrationRequest;
use crate::domain::{
    ContentStoreService, CredentialStore, DisplayName, EmailAddress, FeedEngineService,
    IdentityDirectoryService, RelationshipGraphService, RememberToken,
    SessionAuthenticatorService, User, UserId, UserParts, Viewer,
};
use crate::outbound::persistence::InMemoryStore;

/// Password used by every [`InMemoryServices::register`] account.
pub const DEFAULT_PASSWORD: &str = "foobar";

/// Clock that moves forward by a fixed step on every read, so successive
/// writes get distinct, increasing timestamps.
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
        Self {
            now: Mutex::new(start),
            step,
        }
    }

    /// Clock starting at 2024-01-01T00:00:00Z, ticking one second per read.
    pub fn fixed() -> Self {
        let start = match Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single() {
            Some(start) => start,
            None => panic!("fixture timestamp is valid"),
        };
        Self::new(start, TimeDelta::seconds(1))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.now.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let mut now = self.lock_clock();
        let current = *now;
        *now += self.step;
        current
    }
}

/// Clock that always returns the same instant.
pub struct FrozenClock(pub DateTime<Utc>);

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Credential store at the minimum bcrypt cost.
pub fn fast_credentials() -> Arc<CredentialStore> {
    match CredentialStore::new(CredentialStore::MIN_COST) {
        Ok(store) => Arc::new(store),
        Err(error) => panic!("minimum cost must be accepted: {error}"),
    }
}

/// Build a user without touching any store.
pub fn sample_user(name: &str, email: &str) -> User {
    let (Ok(name), Ok(email)) = (DisplayName::new(name), EmailAddress::new(email)) else {
        panic!("sample user fields must be valid");
    };
    let at = SteppingClock::fixed().utc();
    User::from_parts(UserParts {
        id: UserId::random(),
        name,
        email,
        admin: false,
        remember_token: RememberToken::from_raw("sample-token"),
        created_at: at,
        updated_at: at,
    })
}

/// Registration form with matching password and confirmation.
pub fn registration(name: &str, email: &str, password: &str) -> RegistrationRequest {
    RegistrationRequest {
        name: name.to_owned(),
        email: email.to_owned(),
        password: Zeroizing::new(password.to_owned()),
        password_confirmation: Some(Zeroizing::new(password.to_owned())),
    }
}

pub type MemoryIdentityDirectory = IdentityDirectoryService<InMemoryStore>;
pub type MemoryRelationshipGraph = RelationshipGraphService<InMemoryStore, InMemoryStore>;
pub type MemoryContentStore = ContentStoreService<InMemoryStore, InMemoryStore>;
pub type MemoryFeedEngine = FeedEngineService<InMemoryStore, InMemoryStore, InMemoryStore>;
pub type MemorySessionAuthenticator = SessionAuthenticatorService<InMemoryStore>;

/// Every domain service wired to one [`InMemoryStore`] and a stepping clock.
pub struct InMemoryServices {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<SteppingClock>,
    pub identity: Arc<MemoryIdentityDirectory>,
    pub graph: Arc<MemoryRelationshipGraph>,
    pub content: Arc<MemoryContentStore>,
    pub feed: Arc<MemoryFeedEngine>,
    pub sessions: Arc<MemorySessionAuthenticator>,
}

impl InMemoryServices {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SteppingClock::fixed()))
    }

    pub fn with_clock(clock: Arc<SteppingClock>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let credentials = fast_credentials();
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        Self {
            identity: Arc::new(IdentityDirectoryService::new(
                Arc::clone(&store),
                Arc::clone(&credentials),
                Arc::clone(&dyn_clock),
            )),
            graph: Arc::new(RelationshipGraphService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&dyn_clock),
            )),
            content: Arc::new(ContentStoreService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                dyn_clock,
            )),
            feed: Arc::new(FeedEngineService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&store),
            )),
            sessions: Arc::new(SessionAuthenticatorService::new(
                Arc::clone(&store),
                credentials,
            )),
            store,
            clock,
        }
    }

    /// Register an account with [`DEFAULT_PASSWORD`].
    pub async fn register(&self, name: &str, email: &str) -> User {
        match self
            .identity
            .create(registration(name, email, DEFAULT_PASSWORD))
            .await
        {
            Ok(user) => user,
            Err(error) => panic!("registration of {email} failed: {error:?}"),
        }
    }

    /// Register an account and raise its admin flag directly in storage.
    pub async fn register_admin(&self, name: &str, email: &str) -> User {
        let user = self.register(name, email).await;
        let at = self.clock.utc();
        match UserRepository::set_admin(&*self.store, &user.id(), true, at).await {
            Ok(true) => self.reload(&user).await,
            other => panic!("promoting {email} failed: {other:?}"),
        }
    }

    /// Fresh copy of `user` from storage.
    pub async fn reload(&self, user: &User) -> User {
        match UserRepository::find_by_id(&*self.store, &user.id()).await {
            Ok(Some(user)) => user,
            other => panic!("user {} not found: {other:?}", user.id()),
        }
    }

    /// Viewer acting as the stored version of `user`.
    pub async fn viewer(&self, user: &User) -> Viewer {
        Viewer::Authenticated(self.reload(user).await)
    }
}

impl Default for InMemoryServices {
    fn default() -> Self {
        Self::new()
    }
}
