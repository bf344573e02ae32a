//! Inventory item entity - an owned copy of a shop item or quest reward

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{InventoryItemId, ShopItem, ShopItemId, UserId};

pub const QUEST_REWARD_ITEM_TYPE: &str = "quest_reward";

/// An item held by a user. No lifecycle beyond create/consume/delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub user_id: UserId,
    /// Shop entry this came from; quest rewards get a fresh id
    pub item_id: ShopItemId,
    pub item_name: String,
    #[serde(default)]
    pub item_description: String,
    pub item_type: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub stat_boost: BTreeMap<String, i64>,
    #[serde(default)]
    pub exp_amount: Option<i64>,
    #[serde(default)]
    pub gold_amount: Option<i64>,
    #[serde(default)]
    pub ap_amount: Option<i64>,
    #[serde(default)]
    pub is_synthesis_material: bool,
    pub acquired_at: DateTime<Utc>,
}

fn default_category() -> String {
    "general".to_string()
}

impl InventoryItem {
    /// Mirror a purchased shop item's display and consumable fields.
    pub fn purchased(user_id: UserId, item: &ShopItem, now: DateTime<Utc>) -> Self {
        Self {
            id: InventoryItemId::new(),
            user_id,
            item_id: item.id,
            item_name: item.name.clone(),
            item_description: item.description.clone(),
            item_type: item.item_type.clone(),
            category: item.category.clone(),
            stat_boost: item.stat_boost.clone(),
            exp_amount: item.exp_amount,
            gold_amount: item.gold_amount,
            ap_amount: item.ap_amount,
            is_synthesis_material: item.is_synthesis_material,
            acquired_at: now,
        }
    }

    /// A named item handed out for completing a quest.
    pub fn quest_reward(
        user_id: UserId,
        name: impl Into<String>,
        attribute_rewards: BTreeMap<String, i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InventoryItemId::new(),
            user_id,
            item_id: ShopItemId::new(),
            item_name: name.into(),
            item_description: "Quest reward item".to_string(),
            item_type: QUEST_REWARD_ITEM_TYPE.to_string(),
            category: default_category(),
            stat_boost: attribute_rewards,
            exp_amount: None,
            gold_amount: None,
            ap_amount: None,
            is_synthesis_material: false,
            acquired_at: now,
        }
    }
}
