//! Outcomes of leveling, rewards, purchases and demerits

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{CustomStatId, InventoryItemId, PowerId, QuestId};

/// Result of feeding xp through the leveling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelUpOutcome {
    pub old_level: u32,
    pub new_level: u32,
    pub levels_gained: u32,
}

impl LevelUpOutcome {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Where a single attribute reward (or demerit) landed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum AttributeChange {
    /// strength / intelligence / vitality on the user
    Core { attribute: String, amount: i64 },
    /// One of the user's custom stats
    CustomStat {
        stat_id: CustomStatId,
        name: String,
        amount: i64,
        levels_gained: u32,
    },
    /// No attribute or custom stat by that name
    Unmatched { name: String, amount: i64 },
}

/// What completing a quest granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardSummary {
    pub xp_reward: i64,
    pub gold_reward: i64,
    pub ap_reward: i64,
    pub old_level: u32,
    pub new_level: u32,
    pub levels_gained: u32,
    pub item_reward: Option<String>,
    pub attribute_changes: Vec<AttributeChange>,
}

/// Effect of consuming an inventory item. Exactly one kind fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsumeEffect {
    Exp {
        exp_gained: i64,
        level_up: LevelUpOutcome,
    },
    Gold {
        gold_gained: i64,
    },
    AbilityPoints {
        ap_gained: i64,
    },
}

/// What a purchase produced besides the gold deduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    pub price: i64,
    pub inventory_item_id: InventoryItemId,
    pub power_id: Option<PowerId>,
    /// stat-boost keys that did not match a user field
    pub ignored_boosts: Vec<String>,
}

/// Result of spending an ability point on a power
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerLevelUpOutcome {
    pub power_id: PowerId,
    pub new_level: u32,
    pub ability_points_remaining: i64,
    /// The next-tier power spawned when this one maxed out
    pub evolved_into: Option<PowerId>,
}

/// Demerits charged for one missed deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestDemerit {
    pub id: QuestId,
    pub title: String,
    pub xp_demerit: i64,
    pub gold_demerit: i64,
    pub ap_demerit: i64,
    pub attribute_demerits: BTreeMap<String, i64>,
}

/// Sum of all demerits charged in one failure check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemeritTotals {
    pub xp: i64,
    pub gold: i64,
    pub ap: i64,
    pub attributes: BTreeMap<String, i64>,
}

impl DemeritTotals {
    pub fn add(&mut self, demerit: &QuestDemerit) {
        self.xp += demerit.xp_demerit;
        self.gold += demerit.gold_demerit;
        self.ap += demerit.ap_demerit;
        for (name, amount) in &demerit.attribute_demerits {
            *self.attributes.entry(name.clone()).or_insert(0) += amount;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.xp == 0 && self.gold == 0 && self.ap == 0 && self.attributes.is_empty()
    }
}

/// Report of a deadline failure check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub failed_quests: Vec<QuestDemerit>,
    pub total_demerits: DemeritTotals,
}
