//! List a user's quests, reopening periodic quests whose window elapsed.

use std::sync::Arc;

use questbound_domain::{progression::reset_if_due, Quest, UserId};

use crate::entities::Quests;
use crate::infrastructure::ports::{ClockPort, WriteBatch};
use crate::infrastructure::user_locks::UserLocks;

use super::QuestError;

pub struct ListQuests {
    quests: Arc<Quests>,
    locks: Arc<UserLocks>,
    clock: Arc<dyn ClockPort>,
}

impl ListQuests {
    pub fn new(quests: Arc<Quests>, locks: Arc<UserLocks>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            quests,
            locks,
            clock,
        }
    }

    pub async fn execute(&self, user_id: UserId) -> Result<Vec<Quest>, QuestError> {
        let _guard = self.locks.lock(user_id).await;
        let now = self.clock.now();

        let mut quests = self.quests.list_for_user(user_id).await?;
        let mut batch = WriteBatch::new();
        for quest in &mut quests {
            if reset_if_due(quest, now) {
                Quests::stage(&mut batch, quest)?;
            }
        }

        if !batch.is_empty() {
            let reset = batch.len();
            self.quests.commit(batch).await?;
            tracing::info!(user_id = %user_id, reset, "Reset repeating quests");
        }
        Ok(quests)
    }
}
