//! Custom stat use cases.

mod error;

use std::sync::Arc;

use questbound_domain::{
    CustomStat, CustomStatId, CustomStatUpdate, DomainError, NewCustomStat, UserId,
};

use crate::entities::{CustomStats, Users};
use crate::infrastructure::ports::ClockPort;
use crate::infrastructure::user_locks::UserLocks;

pub use error::CustomStatError;

/// Container for custom stat use cases.
pub struct CustomStatUseCases {
    pub ops: Arc<CustomStatOps>,
}

impl CustomStatUseCases {
    pub fn new(ops: Arc<CustomStatOps>) -> Self {
        Self { ops }
    }
}

/// Custom stat operations.
///
/// Writes take the owner's lock because quest rewards and demerits also
/// modify custom stats.
pub struct CustomStatOps {
    stats: Arc<CustomStats>,
    users: Arc<Users>,
    locks: Arc<UserLocks>,
    clock: Arc<dyn ClockPort>,
}

impl CustomStatOps {
    pub fn new(
        stats: Arc<CustomStats>,
        users: Arc<Users>,
        locks: Arc<UserLocks>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            stats,
            users,
            locks,
            clock,
        }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<CustomStat>, CustomStatError> {
        Ok(self.stats.list_for_user(user_id).await?)
    }

    pub async fn create(
        &self,
        user_id: UserId,
        input: NewCustomStat,
    ) -> Result<CustomStat, CustomStatError> {
        let _guard = self.locks.lock(user_id).await;
        self.users.require(user_id).await?;

        let stat = input.into_stat(user_id, self.clock.now())?;
        self.stats.save(&stat).await?;
        tracing::info!(user_id = %user_id, stat_id = %stat.id, name = %stat.name, "Created custom stat");
        Ok(stat)
    }

    pub async fn update(
        &self,
        user_id: UserId,
        stat_id: CustomStatId,
        update: CustomStatUpdate,
    ) -> Result<CustomStat, CustomStatError> {
        let _guard = self.locks.lock(user_id).await;
        let mut stat = self.owned(user_id, stat_id).await?;
        update.apply(&mut stat)?;
        self.stats.save(&stat).await?;
        tracing::info!(user_id = %user_id, stat_id = %stat_id, "Updated custom stat");
        Ok(stat)
    }

    pub async fn delete(&self, user_id: UserId, stat_id: CustomStatId) -> Result<(), CustomStatError> {
        let _guard = self.locks.lock(user_id).await;
        self.owned(user_id, stat_id).await?;
        self.stats.delete(stat_id).await?;
        tracing::info!(user_id = %user_id, stat_id = %stat_id, "Deleted custom stat");
        Ok(())
    }

    /// A stat belonging to someone else is reported as missing.
    async fn owned(&self, user_id: UserId, stat_id: CustomStatId) -> Result<CustomStat, CustomStatError> {
        match self.stats.get(stat_id).await? {
            Some(stat) if stat.user_id == user_id => Ok(stat),
            _ => Err(DomainError::not_found("Custom stat", stat_id).into()),
        }
    }
}
