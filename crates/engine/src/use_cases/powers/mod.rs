//! Power use cases.
//!
//! Level-ups and evolution links get their own use cases; everything else is
//! in [`PowerOps`].

mod error;
mod evolution;
mod level_up;

use std::collections::BTreeSet;
use std::sync::Arc;

use questbound_domain::{Power, PowerId, PowerUpdate, UserId};

use crate::entities::Powers;
use crate::infrastructure::ports::{RepoError, WriteBatch};
use crate::infrastructure::user_locks::UserLocks;

pub use error::PowerError;
pub use evolution::{EvolutionLinkRequest, LinkEvolution, UnlinkEvolution};
pub use level_up::{LevelUpPower, PowerLevelUpResult};

/// Container for power use cases.
pub struct PowerUseCases {
    pub ops: Arc<PowerOps>,
    pub level_up: Arc<LevelUpPower>,
    pub link: Arc<LinkEvolution>,
    pub unlink: Arc<UnlinkEvolution>,
}

impl PowerUseCases {
    pub fn new(
        ops: Arc<PowerOps>,
        level_up: Arc<LevelUpPower>,
        link: Arc<LinkEvolution>,
        unlink: Arc<UnlinkEvolution>,
    ) -> Self {
        Self {
            ops,
            level_up,
            link,
            unlink,
        }
    }
}

pub struct PowerOps {
    powers: Arc<Powers>,
    locks: Arc<UserLocks>,
}

impl PowerOps {
    pub fn new(powers: Arc<Powers>, locks: Arc<UserLocks>) -> Self {
        Self { powers, locks }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<Power>, PowerError> {
        Ok(self.powers.list_for_user(user_id).await?)
    }

    /// Distinct power categories across every user, sorted.
    pub async fn categories(&self) -> Result<Vec<String>, PowerError> {
        let categories: BTreeSet<String> = self
            .powers
            .all()
            .await?
            .into_iter()
            .map(|p| p.power_category)
            .filter(|c| !c.is_empty())
            .collect();
        Ok(categories.into_iter().collect())
    }

    pub async fn update(&self, power_id: PowerId, update: PowerUpdate) -> Result<Power, PowerError> {
        let owner = self.powers.require(power_id).await?.user_id;
        let _guard = self.locks.lock(owner).await;

        let mut power = self.powers.require(power_id).await?;
        update.apply(&mut power)?;
        self.powers.save(&power).await?;
        tracing::info!(user_id = %owner, power_id = %power_id, "Updated power");
        Ok(power)
    }

    /// Delete a power and clear the evolution links that pointed at it.
    pub async fn delete(&self, power_id: PowerId) -> Result<(), PowerError> {
        let owner = self.powers.require(power_id).await?.user_id;
        let _guard = self.locks.lock(owner).await;

        let powers = self.powers.list_for_user(owner).await?;
        let Some(target) = powers.iter().find(|p| p.id == power_id) else {
            return Err(RepoError::not_found("Power", power_id).into());
        };

        let mut batch = WriteBatch::new();
        for power in powers.iter().filter(|p| p.id != power_id) {
            let linked_parent = power.evolved_abilities.contains(&power_id);
            let linked_child = power.evolved_from == Some(power_id);
            if !linked_parent && !linked_child {
                continue;
            }
            let mut power = power.clone();
            power.evolved_abilities.retain(|id| *id != power_id);
            if linked_child {
                power.evolved_from = None;
            }
            Powers::stage(&mut batch, &power)?;
        }
        let detached = batch.len();
        Powers::stage_delete(&mut batch, target);
        self.powers.commit(batch).await?;

        tracing::info!(user_id = %owner, power_id = %power_id, detached, "Deleted power");
        Ok(())
    }
}
