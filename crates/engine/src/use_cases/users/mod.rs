//! User use cases.
//!
//! Account creation, lookup, progression reset and the user's custom power
//! categories.

mod error;

use std::collections::BTreeMap;
use std::sync::Arc;

use questbound_domain::{DomainError, User, UserId};
use serde::Deserialize;

use crate::entities::Users;
use crate::infrastructure::ports::{ClockPort, WriteBatch};
use crate::infrastructure::user_locks::UserLocks;

pub use error::UserError;

/// Power category name -> subcategory names.
pub type PowerCategories = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
}

/// Container for user use cases.
pub struct UserUseCases {
    pub ops: Arc<UserOps>,
}

impl UserUseCases {
    pub fn new(ops: Arc<UserOps>) -> Self {
        Self { ops }
    }
}

/// User operations.
pub struct UserOps {
    users: Arc<Users>,
    locks: Arc<UserLocks>,
    clock: Arc<dyn ClockPort>,
    list_limit: usize,
}

impl UserOps {
    pub fn new(
        users: Arc<Users>,
        locks: Arc<UserLocks>,
        clock: Arc<dyn ClockPort>,
        list_limit: usize,
    ) -> Self {
        Self {
            users,
            locks,
            clock,
            list_limit,
        }
    }

    /// Create a user, or return the existing one when the username is taken.
    pub async fn create(&self, input: NewUser) -> Result<User, UserError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("Username cannot be empty").into());
        }

        if let Some(existing) = self.users.find_by_username(username).await? {
            tracing::debug!(user_id = %existing.id, username, "Username taken, returning existing user");
            return Ok(existing);
        }

        let user = User::new(username, self.clock.now());
        self.users.save(&user).await?;
        tracing::info!(user_id = %user.id, username, "Created user");
        Ok(user)
    }

    pub async fn get(&self, user_id: UserId) -> Result<User, UserError> {
        Ok(self.users.require(user_id).await?)
    }

    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        Ok(self.users.list(self.list_limit).await?)
    }

    /// Put level, xp, gold, attributes and ability points back to their
    /// starting values. Everything else the user owns is kept.
    pub async fn reset(&self, user_id: UserId) -> Result<User, UserError> {
        let _guard = self.locks.lock(user_id).await;
        let mut user = self.users.require(user_id).await?;
        user.reset_progression();

        let mut batch = WriteBatch::new();
        let user = Users::stage_guarded(&mut batch, &user)?;
        self.users.commit(batch).await?;

        tracing::info!(user_id = %user_id, "Reset user progression");
        Ok(user)
    }

    pub async fn categories(&self, user_id: UserId) -> Result<PowerCategories, UserError> {
        Ok(self.users.require(user_id).await?.custom_categories)
    }

    pub async fn save_categories(
        &self,
        user_id: UserId,
        categories: PowerCategories,
    ) -> Result<PowerCategories, UserError> {
        let _guard = self.locks.lock(user_id).await;
        let mut user = self.users.require(user_id).await?;
        user.custom_categories = categories;

        let mut batch = WriteBatch::new();
        let user = Users::stage_guarded(&mut batch, &user)?;
        self.users.commit(batch).await?;

        tracing::info!(
            user_id = %user_id,
            categories = user.custom_categories.len(),
            "Saved power categories"
        );
        Ok(user.custom_categories)
    }
}
