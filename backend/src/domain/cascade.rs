//! Identity deletion as an explicit, ordered plan.
//!
//! The identity directory decides what a deletion touches; a repository
//! executes the whole plan atomically, so no reader ever sees a user gone
//! while their posts or follow edges remain.

use super::UserId;

/// One mutation in a [`CascadePlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    /// Remove every post authored by the user.
    DeleteMicropostsBy(UserId),
    /// Remove follow edges in both directions.
    DeleteRelationshipsOf(UserId),
    /// Remove the identity record itself.
    DeleteUser(UserId),
}

/// Ordered mutations removing an identity and everything hanging off it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePlan {
    target: UserId,
    steps: Vec<CascadeStep>,
}

impl CascadePlan {
    /// Plan the deletion of `target`: posts, then edges, then the record.
    ///
    /// # Examples
    /// ```
    /// use micropost::domain::{CascadePlan, CascadeStep, UserId};
    ///
    /// let id = UserId::random();
    /// let plan = CascadePlan::destroy_user(id);
    /// assert_eq!(plan.steps().last(), Some(&CascadeStep::DeleteUser(id)));
    /// ```
    pub fn destroy_user(target: UserId) -> Self {
        Self {
            target,
            steps: vec![
                CascadeStep::DeleteMicropostsBy(target),
                CascadeStep::DeleteRelationshipsOf(target),
                CascadeStep::DeleteUser(target),
            ],
        }
    }

    pub fn target(&self) -> UserId {
        self.target
    }

    pub fn steps(&self) -> &[CascadeStep] {
        &self.steps
    }
}

/// Row counts reported after a plan ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub user_deleted: bool,
    pub microposts_deleted: u64,
    pub relationships_deleted: u64,
}

impl CascadeOutcome {
    /// Fold the effect of one step into the running totals.
    pub fn record(&mut self, step: &CascadeStep, affected: u64) {
        match step {
            CascadeStep::DeleteMicropostsBy(_) => self.microposts_deleted += affected,
            CascadeStep::DeleteRelationshipsOf(_) => self.relationships_deleted += affected,
            CascadeStep::DeleteUser(_) => self.user_deleted |= affected > 0,
        }
    }
}
