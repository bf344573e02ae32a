//! Quest use cases.
//!
//! Plain CRUD lives in [`QuestOps`]. Listing, completion and the deadline
//! check each get their own use case since they run progression rules.

mod check_failures;
mod complete_quest;
mod error;
mod list_quests;

use std::sync::Arc;

use questbound_domain::{NewQuest, Quest, QuestId, QuestUpdate};

use crate::entities::{Quests, Users};
use crate::infrastructure::ports::ClockPort;
use crate::infrastructure::user_locks::UserLocks;

pub use check_failures::CheckFailures;
pub use complete_quest::{CompleteQuest, QuestCompletionResult};
pub use error::QuestError;
pub use list_quests::ListQuests;

/// Container for quest use cases.
pub struct QuestUseCases {
    pub ops: Arc<QuestOps>,
    pub list: Arc<ListQuests>,
    pub complete: Arc<CompleteQuest>,
    pub check_failures: Arc<CheckFailures>,
}

impl QuestUseCases {
    pub fn new(
        ops: Arc<QuestOps>,
        list: Arc<ListQuests>,
        complete: Arc<CompleteQuest>,
        check_failures: Arc<CheckFailures>,
    ) -> Self {
        Self {
            ops,
            list,
            complete,
            check_failures,
        }
    }
}

/// Quest create/update/delete.
pub struct QuestOps {
    quests: Arc<Quests>,
    users: Arc<Users>,
    locks: Arc<UserLocks>,
    clock: Arc<dyn ClockPort>,
}

impl QuestOps {
    pub fn new(
        quests: Arc<Quests>,
        users: Arc<Users>,
        locks: Arc<UserLocks>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            quests,
            users,
            locks,
            clock,
        }
    }

    pub async fn create(&self, input: NewQuest) -> Result<Quest, QuestError> {
        self.users.require(input.user_id).await?;
        let quest = input.into_quest(self.clock.now())?;
        self.quests.save(&quest).await?;
        tracing::info!(
            user_id = %quest.user_id,
            quest_id = %quest.id,
            difficulty = ?quest.difficulty,
            xp_reward = quest.xp_reward,
            gold_reward = quest.gold_reward,
            "Created quest"
        );
        Ok(quest)
    }

    pub async fn update(&self, quest_id: QuestId, update: QuestUpdate) -> Result<Quest, QuestError> {
        let owner = self.quests.require(quest_id).await?.user_id;
        let _guard = self.locks.lock(owner).await;

        let mut quest = self.quests.require(quest_id).await?;
        update.apply(&mut quest)?;
        self.quests.save(&quest).await?;
        tracing::info!(user_id = %owner, quest_id = %quest_id, "Updated quest");
        Ok(quest)
    }

    pub async fn delete(&self, quest_id: QuestId) -> Result<(), QuestError> {
        let owner = self.quests.require(quest_id).await?.user_id;
        let _guard = self.locks.lock(owner).await;

        self.quests.delete(quest_id).await?;
        tracing::info!(user_id = %owner, quest_id = %quest_id, "Deleted quest");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::TestEnv;
    use questbound_domain::{Difficulty, UserId};

    fn ops(env: &TestEnv) -> QuestOps {
        QuestOps::new(
            env.repos.quests.clone(),
            env.repos.users.clone(),
            env.locks.clone(),
            env.clock.clone(),
        )
    }

    #[tokio::test]
    async fn create_derives_rewards_from_difficulty() {
        let env = TestEnv::new();
        let user = env.user("Hero").await;

        let quest = ops(&env)
            .create(NewQuest {
                user_id: user.id,
                title: "Ship the release".to_string(),
                difficulty: Some(Difficulty::Hard),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!((quest.xp_reward, quest.gold_reward), (200, 50));
        assert_eq!(env.repos.quests.require(quest.id).await.unwrap(), quest);
    }

    #[tokio::test]
    async fn create_requires_an_existing_user() {
        let env = TestEnv::new();
        let result = ops(&env)
            .create(NewQuest {
                user_id: UserId::new(),
                title: "Orphan".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(QuestError::Repo(e)) if e.is_not_found()));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let env = TestEnv::new();
        let user = env.user("Hero").await;
        let quest = env
            .quest(NewQuest {
                user_id: user.id,
                title: "Stretch".to_string(),
                ..Default::default()
            })
            .await;
        let ops = ops(&env);

        let updated = ops
            .update(
                quest.id,
                QuestUpdate {
                    title: Some("Stretch twice".to_string()),
                    xp_reward: Some(75),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Stretch twice");
        assert_eq!(updated.xp_reward, 75);

        let rejected = ops
            .update(
                quest.id,
                QuestUpdate {
                    gold_reward: Some(-1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(rejected, Err(QuestError::Domain(_))));

        ops.delete(quest.id).await.unwrap();
        let again = ops.delete(quest.id).await;
        assert!(matches!(again, Err(QuestError::Repo(e)) if e.is_not_found()));
    }
}
