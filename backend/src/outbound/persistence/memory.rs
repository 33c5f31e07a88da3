//! In-process store implementing every driven port.
//!
//! One `RwLock` guards all three tables, so a cascade holds the write lock
//! for the whole plan and readers never observe a partial deletion. Used by
//! tests and by the server when no database URL is configured.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use tokio::sync::RwLock;

use crate::domain::micropost::sort_newest_first;
use crate::domain::ports::{
    MicropostPersistenceError, MicropostRepository, RelationshipPersistenceError,
    RelationshipRepository, UserPersistenceError, UserRepository, UserUpdate,
};
use crate::domain::{
    CascadeOutcome, CascadePlan, CascadeStep, EmailAddress, FollowCounts, Micropost,
    MicropostId, RememberToken, User, UserId, UserRecord,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, UserRecord>,
    relationships: BTreeMap<(UserId, UserId), DateTime<Utc>>,
    microposts: BTreeMap<MicropostId, Micropost>,
}

impl Tables {
    fn email_owner(&self, email: &EmailAddress) -> Option<UserId> {
        self.users
            .values()
            .find(|record| record.user.email() == email)
            .map(|record| record.user.id())
    }

    fn delete_microposts_by(&mut self, author: UserId) -> u64 {
        let before = self.microposts.len();
        self.microposts.retain(|_, post| post.author_id() != author);
        count(before - self.microposts.len())
    }

    fn delete_relationships_of(&mut self, id: UserId) -> u64 {
        let before = self.relationships.len();
        self.relationships
            .retain(|(follower, followed), _| *follower != id && *followed != id);
        count(before - self.relationships.len())
    }

    fn delete_user(&mut self, id: UserId) -> u64 {
        u64::from(self.users.remove(&id).is_some())
    }

    fn update_user<F>(&mut self, id: &UserId, change: F) -> bool
    where
        F: FnOnce(User) -> User,
    {
        match self.users.get_mut(id) {
            Some(record) => {
                record.user = change(record.user.clone());
                true
            }
            None => false,
        }
    }
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Shared in-memory tables for users, relationships and microposts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, record: &UserRecord) -> Result<(), UserPersistenceError> {
        let mut tables = self.tables.write().await;
        if tables.email_owner(record.user.email()).is_some() {
            return Err(UserPersistenceError::duplicate_email(
                record.user.email().as_ref(),
            ));
        }
        tables.users.insert(record.user.id(), record.clone());
        Ok(())
    }

    async fn update(&self, update: &UserUpdate) -> Result<bool, UserPersistenceError> {
        let mut tables = self.tables.write().await;
        let id = update.user.id();
        if tables
            .email_owner(update.user.email())
            .is_some_and(|owner| owner != id)
        {
            return Err(UserPersistenceError::duplicate_email(
                update.user.email().as_ref(),
            ));
        }
        let Some(record) = tables.users.get_mut(&id) else {
            return Ok(false);
        };
        // Profile columns only: the admin flag and creation time stay as stored.
        let changes = &update.user;
        record.user = record
            .user
            .clone()
            .with_profile(changes.name().clone(), changes.email().clone(), changes.updated_at())
            .with_remember_token(changes.remember_token().clone());
        if let Some(digest) = &update.password_digest {
            record.password_digest = digest.clone();
        }
        Ok(true)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(id).map(|record| record.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, UserPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|record| record.user.email() == email)
            .cloned())
    }

    async fn list(&self, page: &PageRequest) -> Result<Page<User>, UserPersistenceError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .map(|record| record.user.clone())
            .collect();
        users.sort_by_key(|user| (user.created_at(), user.id()));
        Ok(Page::from_sorted(users, *page))
    }

    async fn store_remember_token(
        &self,
        id: &UserId,
        token: &RememberToken,
    ) -> Result<bool, UserPersistenceError> {
        let mut tables = self.tables.write().await;
        Ok(tables.update_user(id, |user| user.with_remember_token(token.clone())))
    }

    async fn set_admin(
        &self,
        id: &UserId,
        admin: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, UserPersistenceError> {
        let mut tables = self.tables.write().await;
        Ok(tables.update_user(id, |user| user.with_admin(admin, at)))
    }

    async fn delete_cascade(
        &self,
        plan: &CascadePlan,
    ) -> Result<CascadeOutcome, UserPersistenceError> {
        let mut tables = self.tables.write().await;
        let mut outcome = CascadeOutcome::default();
        for step in plan.steps() {
            let affected = match *step {
                CascadeStep::DeleteMicropostsBy(id) => tables.delete_microposts_by(id),
                CascadeStep::DeleteRelationshipsOf(id) => tables.delete_relationships_of(id),
                CascadeStep::DeleteUser(id) => tables.delete_user(id),
            };
            outcome.record(step, affected);
        }
        Ok(outcome)
    }
}

#[async_trait]
impl RelationshipRepository for InMemoryStore {
    async fn insert(
        &self,
        follower: &UserId,
        followed: &UserId,
        at: DateTime<Utc>,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(follower) || !tables.users.contains_key(followed) {
            return Err(RelationshipPersistenceError::query(
                "relationship endpoint does not exist",
            ));
        }
        let key = (*follower, *followed);
        if tables.relationships.contains_key(&key) {
            return Ok(false);
        }
        tables.relationships.insert(key, at);
        Ok(true)
    }

    async fn delete(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut tables = self.tables.write().await;
        Ok(tables.relationships.remove(&(*follower, *followed)).is_some())
    }

    async fn exists(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.relationships.contains_key(&(*follower, *followed)))
    }

    async fn following(&self, id: &UserId) -> Result<Vec<UserId>, RelationshipPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables
            .relationships
            .keys()
            .filter(|(follower, _)| follower == id)
            .map(|(_, followed)| *followed)
            .collect())
    }

    async fn followers(&self, id: &UserId) -> Result<Vec<UserId>, RelationshipPersistenceError> {
        let tables = self.tables.read().await;
        let mut ids: Vec<UserId> = tables
            .relationships
            .keys()
            .filter(|(_, followed)| followed == id)
            .map(|(follower, _)| *follower)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn counts(&self, id: &UserId) -> Result<FollowCounts, RelationshipPersistenceError> {
        let tables = self.tables.read().await;
        let mut counts = FollowCounts::default();
        for (follower, followed) in tables.relationships.keys() {
            if follower == id {
                counts.following += 1;
            }
            if followed == id {
                counts.followers += 1;
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl MicropostRepository for InMemoryStore {
    async fn insert(&self, post: &Micropost) -> Result<(), MicropostPersistenceError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author_id()) {
            return Err(MicropostPersistenceError::query(
                "micropost author does not exist",
            ));
        }
        tables.microposts.insert(post.id(), post.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &MicropostId,
    ) -> Result<Option<Micropost>, MicropostPersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.microposts.get(id).cloned())
    }

    async fn delete(&self, id: &MicropostId) -> Result<bool, MicropostPersistenceError> {
        let mut tables = self.tables.write().await;
        Ok(tables.microposts.remove(id).is_some())
    }

    async fn list_by_authors(
        &self,
        authors: &[UserId],
        page: &PageRequest,
    ) -> Result<Page<Micropost>, MicropostPersistenceError> {
        let authors: BTreeSet<UserId> = authors.iter().copied().collect();
        let tables = self.tables.read().await;
        let mut posts: Vec<Micropost> = tables
            .microposts
            .values()
            .filter(|post| authors.contains(&post.author_id()))
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        Ok(Page::from_sorted(posts, *page))
    }
}
