//! Shop item entity - things users can buy with gold

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DomainError, PowerTier, ShopItemId};

/// An entry in the shop catalogue.
///
/// Simple data struct; the purchase rules live in
/// [`crate::progression::purchase`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: ShopItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    /// Remaining stock. `None` means unlimited.
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_power: bool,
    #[serde(default)]
    pub power_category: Option<String>,
    #[serde(default)]
    pub power_subcategory: Option<String>,
    #[serde(default)]
    pub power_tier: Option<PowerTier>,
    #[serde(default)]
    pub power_max_level: Option<u32>,
    #[serde(default)]
    pub next_tier_ability: Option<String>,
    #[serde(default)]
    pub stat_boost: BTreeMap<String, i64>,
    /// weapon, armor, potion, accessory, exp, gold, ability_points, synthesis_material, ...
    pub item_type: String,
    #[serde(default)]
    pub exp_amount: Option<i64>,
    #[serde(default)]
    pub gold_amount: Option<i64>,
    #[serde(default)]
    pub ap_amount: Option<i64>,
    #[serde(default)]
    pub is_synthesis_material: bool,
}

impl ShopItem {
    /// Whether buying this item also grants a power.
    pub fn grants_power(&self) -> bool {
        self.is_power && self.power_category.is_some()
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

fn default_category() -> String {
    "general".to_string()
}

/// Full shop item body used for both create and replace.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopItemInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_power: bool,
    #[serde(default)]
    pub power_category: Option<String>,
    #[serde(default)]
    pub power_subcategory: Option<String>,
    #[serde(default)]
    pub power_tier: Option<PowerTier>,
    #[serde(default)]
    pub power_max_level: Option<u32>,
    #[serde(default)]
    pub next_tier_ability: Option<String>,
    #[serde(default)]
    pub stat_boost: BTreeMap<String, i64>,
    pub item_type: String,
    #[serde(default)]
    pub exp_amount: Option<i64>,
    #[serde(default)]
    pub gold_amount: Option<i64>,
    #[serde(default)]
    pub ap_amount: Option<i64>,
    #[serde(default)]
    pub is_synthesis_material: bool,
}

impl ShopItemInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Shop item name cannot be empty"));
        }
        if self.item_type.trim().is_empty() {
            return Err(DomainError::validation("Shop item type cannot be empty"));
        }
        if self.price < 0 {
            return Err(DomainError::validation("Shop item price cannot be negative"));
        }
        if matches!(self.stock, Some(stock) if stock < 0) {
            return Err(DomainError::validation("Shop item stock cannot be negative"));
        }
        if self.power_max_level == Some(0) {
            return Err(DomainError::validation("Power max level must be at least 1"));
        }
        Ok(())
    }

    /// Build a record with the given id (new for create, existing for replace).
    pub fn into_item(self, id: ShopItemId) -> Result<ShopItem, DomainError> {
        self.validate()?;
        Ok(ShopItem {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            price: self.price,
            stock: self.stock,
            category: self.category,
            images: self.images,
            is_power: self.is_power,
            power_category: self.power_category,
            power_subcategory: self.power_subcategory,
            power_tier: self.power_tier,
            power_max_level: self.power_max_level,
            next_tier_ability: self.next_tier_ability,
            stat_boost: self.stat_boost,
            item_type: self.item_type.trim().to_string(),
            exp_amount: self.exp_amount,
            gold_amount: self.gold_amount,
            ap_amount: self.ap_amount,
            is_synthesis_material: self.is_synthesis_material,
        })
    }
}
