//! Completing a quest and granting its rewards.

use chrono::{DateTime, Utc};

use super::attributes::apply_attribute_rewards;
use super::leveling::apply_xp;
use crate::{CustomStat, DomainError, InventoryItem, Quest, RewardSummary, User};

/// Next-state records produced by completing a quest.
#[derive(Debug, Clone)]
pub struct QuestCompletion {
    pub quest: Quest,
    pub user: User,
    /// Only the custom stats the rewards touched
    pub custom_stats: Vec<CustomStat>,
    pub reward_item: Option<InventoryItem>,
    pub summary: RewardSummary,
}

/// Complete `quest` for its owner.
///
/// Limitless quests stay uncompleted so they can be done again. Anything else
/// must be open (neither completed nor failed in the current cycle).
pub fn complete_quest(
    quest: &Quest,
    user: &User,
    custom_stats: &[CustomStat],
    now: DateTime<Utc>,
) -> Result<QuestCompletion, DomainError> {
    if quest.user_id != user.id {
        return Err(DomainError::invalid_state("Quest does not belong to this user"));
    }
    if !quest.is_limitless() {
        if quest.completed {
            return Err(DomainError::invalid_state("Quest already completed"));
        }
        if quest.failed {
            return Err(DomainError::invalid_state(
                "Quest failed its deadline and cannot be completed this cycle",
            ));
        }
    }

    let mut quest = quest.clone();
    quest.completed = !quest.is_limitless();
    quest.completed_at = Some(now);
    quest.last_completed = Some(now);

    let mut user = user.clone();
    user.gold = user.gold.saturating_add(quest.gold_reward);
    user.ability_points = user.ability_points.saturating_add(quest.ap_reward);
    let level_up = apply_xp(&mut user, quest.xp_reward);

    let mut stats = custom_stats.to_vec();
    let attribute_changes = apply_attribute_rewards(&mut user, &mut stats, &quest.attribute_rewards);
    let touched: Vec<CustomStat> = stats
        .into_iter()
        .zip(custom_stats)
        .filter(|(after, before)| after != *before)
        .map(|(after, _)| after)
        .collect();

    let reward_item = quest.item_reward.as_ref().map(|name| {
        InventoryItem::quest_reward(user.id, name.clone(), quest.attribute_rewards.clone(), now)
    });

    let summary = RewardSummary {
        xp_reward: quest.xp_reward,
        gold_reward: quest.gold_reward,
        ap_reward: quest.ap_reward,
        old_level: level_up.old_level,
        new_level: level_up.new_level,
        levels_gained: level_up.levels_gained,
        item_reward: quest.item_reward.clone(),
        attribute_changes,
    };

    Ok(QuestCompletion {
        quest,
        user,
        custom_stats: touched,
        reward_item,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CustomStatId, NewQuest, RepeatFrequency, QUEST_REWARD_ITEM_TYPE};
    use std::collections::BTreeMap;

    fn quest_for(user: &User, xp: i64) -> Quest {
        NewQuest {
            user_id: user.id,
            title: "Deep work".to_string(),
            xp_reward: Some(xp),
            gold_reward: Some(10),
            ap_reward: Some(1),
            ..Default::default()
        }
        .into_quest(Utc::now())
        .unwrap()
    }

    #[test]
    fn completing_grants_xp_gold_and_ap() {
        let user = User::new("Hero", Utc::now());
        let quest = quest_for(&user, 150);

        let done = complete_quest(&quest, &user, &[], Utc::now()).unwrap();

        assert!(done.quest.completed);
        assert!(done.quest.completed_at.is_some());
        assert_eq!(done.user.level, 2);
        assert_eq!(done.user.xp, 50);
        assert_eq!(done.user.gold, 110);
        // 5 starting + 1 quest + 2 for the level
        assert_eq!(done.user.ability_points, 8);
        assert_eq!(done.summary.levels_gained, 1);
        assert_eq!(done.summary.old_level, 1);
        assert!(done.reward_item.is_none());
    }

    #[test]
    fn completed_quest_cannot_be_completed_again() {
        let user = User::new("Hero", Utc::now());
        let quest = quest_for(&user, 10);
        let done = complete_quest(&quest, &user, &[], Utc::now()).unwrap();

        let err = complete_quest(&done.quest, &done.user, &[], Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn limitless_quest_never_stays_completed() {
        let mut user = User::new("Hero", Utc::now());
        let mut quest = quest_for(&user, 10);
        quest.repeat_frequency = RepeatFrequency::Limitless;

        for _ in 0..3 {
            let done = complete_quest(&quest, &user, &[], Utc::now()).unwrap();
            assert!(!done.quest.completed);
            assert!(done.quest.last_completed.is_some());
            quest = done.quest;
            user = done.user;
        }
        assert_eq!(user.xp, 30);
        assert_eq!(user.gold, 130);
    }

    #[test]
    fn failed_quest_is_rejected() {
        let user = User::new("Hero", Utc::now());
        let mut quest = quest_for(&user, 10);
        quest.failed = true;
        assert!(complete_quest(&quest, &user, &[], Utc::now()).is_err());
    }

    #[test]
    fn item_reward_creates_a_quest_reward_item() {
        let user = User::new("Hero", Utc::now());
        let mut quest = quest_for(&user, 10);
        quest.item_reward = Some("Trophy".to_string());
        quest.attribute_rewards = BTreeMap::from([("strength".to_string(), 2)]);

        let done = complete_quest(&quest, &user, &[], Utc::now()).unwrap();

        let item = done.reward_item.unwrap();
        assert_eq!(item.item_name, "Trophy");
        assert_eq!(item.item_type, QUEST_REWARD_ITEM_TYPE);
        assert_eq!(item.user_id, user.id);
        assert_eq!(item.stat_boost.get("strength"), Some(&2));
        assert_eq!(done.user.strength, 12);
        assert_eq!(done.summary.item_reward.as_deref(), Some("Trophy"));
    }

    #[test]
    fn only_touched_custom_stats_are_returned() {
        let user = User::new("Hero", Utc::now());
        let make = |name: &str| CustomStat {
            id: CustomStatId::new(),
            user_id: user.id,
            name: name.to_string(),
            color: "#000".to_string(),
            current: 0,
            max: 10,
            level: 1,
            icon: None,
            created_at: Utc::now(),
        };
        let stats = vec![make("Focus"), make("Calm")];
        let mut quest = quest_for(&user, 0);
        quest.attribute_rewards = BTreeMap::from([("calm".to_string(), 12)]);

        let done = complete_quest(&quest, &user, &stats, Utc::now()).unwrap();

        assert_eq!(done.custom_stats.len(), 1);
        assert_eq!(done.custom_stats[0].name, "Calm");
        assert_eq!(done.custom_stats[0].level, 2);
        assert_eq!(done.custom_stats[0].current, 2);
    }

    #[test]
    fn quest_of_another_user_is_rejected() {
        let user = User::new("Hero", Utc::now());
        let other = User::new("Rival", Utc::now());
        let quest = quest_for(&other, 10);
        assert!(complete_quest(&quest, &user, &[], Utc::now()).is_err());
    }
}
