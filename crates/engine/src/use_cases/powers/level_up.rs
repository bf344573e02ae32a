//! Spend an ability point on a power.

use std::sync::Arc;

use questbound_domain::{
    progression::level_up_power, Power, PowerId, PowerLevelUpOutcome, User,
};
use serde::Serialize;

use crate::entities::{Powers, Shop, Users};
use crate::infrastructure::ports::{ClockPort, WriteBatch};
use crate::infrastructure::user_locks::UserLocks;

use super::PowerError;

#[derive(Debug, Clone, Serialize)]
pub struct PowerLevelUpResult {
    pub power: Power,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evolved_power: Option<Power>,
    #[serde(flatten)]
    pub outcome: PowerLevelUpOutcome,
}

pub struct LevelUpPower {
    powers: Arc<Powers>,
    users: Arc<Users>,
    shop: Arc<Shop>,
    locks: Arc<UserLocks>,
    clock: Arc<dyn ClockPort>,
}

impl LevelUpPower {
    pub fn new(
        powers: Arc<Powers>,
        users: Arc<Users>,
        shop: Arc<Shop>,
        locks: Arc<UserLocks>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            powers,
            users,
            shop,
            locks,
            clock,
        }
    }

    pub async fn execute(&self, power_id: PowerId) -> Result<PowerLevelUpResult, PowerError> {
        let owner = self.powers.require(power_id).await?.user_id;
        let _guard = self.locks.lock(owner).await;

        let power = self.powers.require(power_id).await?;
        let user = self.users.require(owner).await?;

        let next_tier_entry = match &power.next_tier_ability {
            Some(name) if power.evolves_on_next_level() => self.shop.find_power_named(name).await?,
            _ => None,
        };

        let level_up = match level_up_power(&power, &user, next_tier_entry.as_ref(), self.clock.now()) {
            Ok(level_up) => level_up,
            Err(e) => {
                tracing::warn!(user_id = %owner, power_id = %power_id, error = %e, "Power level-up rejected");
                return Err(e.into());
            }
        };

        let mut batch = WriteBatch::new();
        Powers::stage(&mut batch, &level_up.power)?;
        if let Some(spawned) = &level_up.spawned {
            Powers::stage(&mut batch, spawned)?;
        }
        let user = Users::stage_guarded(&mut batch, &level_up.user)?;
        self.powers.commit(batch).await?;

        tracing::info!(
            user_id = %owner,
            power_id = %power_id,
            new_level = level_up.outcome.new_level,
            "Leveled up power"
        );
        if let Some(spawned) = &level_up.spawned {
            tracing::info!(
                user_id = %owner,
                power_id = %power_id,
                evolved_into = %spawned.id,
                name = %spawned.name,
                tier = %spawned.power_tier,
                "Power evolved"
            );
        }

        Ok(PowerLevelUpResult {
            power: level_up.power,
            user,
            evolved_power: level_up.spawned,
            outcome: level_up.outcome,
        })
    }
}
