//! Identity lifecycle: registration, profile edits, listing and deletion.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;
use zeroize::Zeroizing;

use super::credentials::off_thread;
use super::ports::{IdentityDirectory, UserRepository, UserUpdate};
use super::validation::{
    ProfileUpdate, RegistrationRequest, ValidationErrors, validate_profile_update,
    validate_registration,
};
use super::{
    CascadeOutcome, CascadePlan, CredentialStore, EmailAddress, Error, PasswordDigest,
    SessionArtifact, SignedInUser, User, UserId, UserParts, UserRecord, Viewer,
};

/// Identity directory backed by a [`UserRepository`].
#[derive(Clone)]
pub struct IdentityDirectoryService<U> {
    users: Arc<U>,
    credentials: Arc<CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl<U> IdentityDirectoryService<U> {
    /// Create a new directory.
    pub fn new(users: Arc<U>, credentials: Arc<CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            credentials,
            clock,
        }
    }
}

impl<U> IdentityDirectoryService<U>
where
    U: UserRepository,
{
    async fn load(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(&id)
            .await
            .map_err(Error::from)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn ensure_email_free(
        &self,
        email: &EmailAddress,
        owner: Option<UserId>,
    ) -> Result<(), Error> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(Error::from)?;
        match existing {
            Some(record) if Some(record.user.id()) != owner => {
                Err(ValidationErrors::email_taken().into())
            }
            _ => Ok(()),
        }
    }

    async fn digest(
        &self,
        password: Zeroizing<String>,
        id: UserId,
    ) -> Result<PasswordDigest, Error> {
        let store = Arc::clone(&self.credentials);
        off_thread(move || store.hash(&password, &id))
            .await?
            .map_err(|error| Error::internal(error.to_string()))
    }
}

#[async_trait]
impl<U> IdentityDirectory for IdentityDirectoryService<U>
where
    U: UserRepository,
{
    async fn create(&self, request: RegistrationRequest) -> Result<User, Error> {
        let valid = validate_registration(request)?;
        self.ensure_email_free(&valid.email, None).await?;

        let id = UserId::random();
        let password_digest = self.digest(valid.password, id).await?;
        let now = self.clock.utc();
        let user = User::from_parts(UserParts {
            id,
            name: valid.name,
            email: valid.email,
            admin: false,
            remember_token: self.credentials.generate_token(),
            created_at: now,
            updated_at: now,
        });
        let record = UserRecord {
            user,
            password_digest,
        };
        self.users
            .insert(&record)
            .await
            .map_err(Error::from)?;

        info!(user_id = %id, "identity registered");
        Ok(record.user)
    }

    async fn update(
        &self,
        viewer: &Viewer,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<SignedInUser, Error> {
        let actor = viewer.require_user()?;
        if actor.id() != id {
            return Err(Error::forbidden("users may only edit their own profile"));
        }
        let current = self.load(id).await?;
        let valid = validate_profile_update(&current, update)?;
        if valid.changes_email(&current) {
            self.ensure_email_free(&valid.email, Some(id)).await?;
        }

        let password_digest = match valid.password {
            Some(password) => Some(self.digest(password, id).await?),
            None => None,
        };
        let token = self.credentials.generate_token();
        let user = current
            .with_profile(valid.name, valid.email, self.clock.utc())
            .with_remember_token(token.clone());
        let change = UserUpdate {
            user,
            password_digest,
        };
        let updated = self
            .users
            .update(&change)
            .await
            .map_err(Error::from)?;
        if !updated {
            return Err(Error::not_found(format!("user {id} not found")));
        }

        info!(
            user_id = %id,
            password_changed = change.password_digest.is_some(),
            "profile updated"
        );
        Ok(SignedInUser {
            user: change.user,
            session: SessionArtifact::new(id, token),
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, Error> {
        self.load(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<User, Error> {
        let Ok(address) = EmailAddress::new(email) else {
            return Err(Error::not_found("user not found"));
        };
        self.users
            .find_by_email(&address)
            .await
            .map_err(Error::from)?
            .map(|record| record.user)
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, Error> {
        self.users
            .list(&page)
            .await
            .map_err(Error::from)
    }

    async fn destroy(&self, viewer: &Viewer, target: UserId) -> Result<CascadeOutcome, Error> {
        let actor = viewer.require_admin()?;
        if actor.id() == target {
            return Err(Error::forbidden("administrators cannot delete themselves"));
        }
        self.load(target).await?;

        let plan = CascadePlan::destroy_user(target);
        let outcome = self
            .users
            .delete_cascade(&plan)
            .await
            .map_err(Error::from)?;
        if !outcome.user_deleted {
            return Err(Error::not_found(format!("user {target} not found")));
        }

        info!(
            user_id = %target,
            admin_id = %actor.id(),
            microposts = outcome.microposts_deleted,
            relationships = outcome.relationships_deleted,
            "identity destroyed"
        );
        Ok(outcome)
    }

    async fn promote(&self, viewer: &Viewer, target: UserId) -> Result<User, Error> {
        let actor = viewer.require_admin()?;
        let updated = self
            .users
            .set_admin(&target, true, self.clock.utc())
            .await
            .map_err(Error::from)?;
        if !updated {
            return Err(Error::not_found(format!("user {target} not found")));
        }
        info!(user_id = %target, admin_id = %actor.id(), "identity promoted");
        self.load(target).await
    }
}
