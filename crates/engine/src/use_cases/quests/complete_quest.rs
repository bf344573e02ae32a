//! Complete a quest and grant its rewards.

use std::sync::Arc;

use questbound_domain::{
    progression::{complete_quest, reset_if_due},
    CustomStat, InventoryItem, Quest, QuestId, RewardSummary, User,
};
use serde::Serialize;

use crate::entities::{CustomStats, Inventory, Quests, Users};
use crate::infrastructure::ports::{ClockPort, WriteBatch};
use crate::infrastructure::user_locks::UserLocks;

use super::QuestError;

#[derive(Debug, Clone, Serialize)]
pub struct QuestCompletionResult {
    pub quest: Quest,
    pub user: User,
    #[serde(flatten)]
    pub rewards: RewardSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_item: Option<InventoryItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_stats: Vec<CustomStat>,
}

pub struct CompleteQuest {
    quests: Arc<Quests>,
    users: Arc<Users>,
    custom_stats: Arc<CustomStats>,
    locks: Arc<UserLocks>,
    clock: Arc<dyn ClockPort>,
}

impl CompleteQuest {
    pub fn new(
        quests: Arc<Quests>,
        users: Arc<Users>,
        custom_stats: Arc<CustomStats>,
        locks: Arc<UserLocks>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            quests,
            users,
            custom_stats,
            locks,
            clock,
        }
    }

    pub async fn execute(&self, quest_id: QuestId) -> Result<QuestCompletionResult, QuestError> {
        let owner = self.quests.require(quest_id).await?.user_id;
        let _guard = self.locks.lock(owner).await;

        // Re-read under the lock; the first read only told us whose lock to take.
        let mut quest = self.quests.require(quest_id).await?;
        let user = self.users.require(owner).await?;
        let stats = self.custom_stats.list_for_user(owner).await?;
        let now = self.clock.now();

        reset_if_due(&mut quest, now);
        let completion = match complete_quest(&quest, &user, &stats, now) {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!(user_id = %owner, quest_id = %quest_id, error = %e, "Quest completion rejected");
                return Err(e.into());
            }
        };

        let mut batch = WriteBatch::new();
        Quests::stage(&mut batch, &completion.quest)?;
        for stat in &completion.custom_stats {
            CustomStats::stage(&mut batch, stat)?;
        }
        if let Some(item) = &completion.reward_item {
            Inventory::stage(&mut batch, item)?;
        }
        let user = Users::stage_guarded(&mut batch, &completion.user)?;
        self.users.commit(batch).await?;

        let summary = &completion.summary;
        tracing::info!(
            user_id = %owner,
            quest_id = %quest_id,
            xp = summary.xp_reward,
            gold = summary.gold_reward,
            levels_gained = summary.levels_gained,
            "Completed quest"
        );

        Ok(QuestCompletionResult {
            quest: completion.quest,
            user,
            rewards: completion.summary,
            reward_item: completion.reward_item,
            custom_stats: completion.custom_stats,
        })
    }
}
