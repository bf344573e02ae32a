//! Buying a shop item.

use chrono::{DateTime, Utc};

use crate::{
    DomainError, InventoryItem, Power, PowerId, PurchaseReceipt, ShopItem, User, UserStat,
    DEFAULT_POWER_MAX_LEVEL,
};

/// Next-state records produced by a purchase. The caller must persist all of
/// them together or none.
#[derive(Debug, Clone)]
pub struct Purchase {
    pub user: User,
    /// The shop entry with its stock decremented (unchanged when unlimited)
    pub shop_item: ShopItem,
    pub inventory_item: InventoryItem,
    pub power: Option<Power>,
    pub receipt: PurchaseReceipt,
}

/// Buy `item` for `user`.
///
/// A rejected purchase produces nothing, so there is no state to roll back.
pub fn purchase_item(
    user: &User,
    item: &ShopItem,
    now: DateTime<Utc>,
) -> Result<Purchase, DomainError> {
    if let Some(stock) = item.stock {
        if stock < 1 {
            return Err(DomainError::insufficient("stock", 1, stock));
        }
    }
    if user.gold < item.price {
        return Err(DomainError::insufficient("gold", item.price, user.gold));
    }

    let mut user = user.clone();
    user.gold -= item.price;

    let mut ignored_boosts = Vec::new();
    for (key, boost) in &item.stat_boost {
        match UserStat::from_key(key) {
            Some(stat) => {
                let value = user.stat_mut(stat);
                *value = value.saturating_add(*boost);
            }
            None => ignored_boosts.push(key.clone()),
        }
    }

    let mut shop_item = item.clone();
    if let Some(stock) = shop_item.stock.as_mut() {
        *stock -= 1;
    }

    let inventory_item = InventoryItem::purchased(user.id, item, now);
    let power = power_from_item(&user, item, now);

    let receipt = PurchaseReceipt {
        price: item.price,
        inventory_item_id: inventory_item.id,
        power_id: power.as_ref().map(|p| p.id),
        ignored_boosts,
    };

    Ok(Purchase {
        user,
        shop_item,
        inventory_item,
        power,
        receipt,
    })
}

fn power_from_item(user: &User, item: &ShopItem, now: DateTime<Utc>) -> Option<Power> {
    if !item.grants_power() {
        return None;
    }
    let category = item.power_category.clone()?;
    Some(Power {
        id: PowerId::new(),
        user_id: user.id,
        shop_item_id: item.id,
        name: item.name.clone(),
        description: item.description.clone(),
        power_category: category,
        power_subcategory: item.power_subcategory.clone(),
        power_tier: item.power_tier.unwrap_or_default(),
        current_level: 1,
        max_level: item.power_max_level.unwrap_or(DEFAULT_POWER_MAX_LEVEL),
        next_tier_ability: item.next_tier_ability.clone(),
        sub_abilities: Vec::new(),
        image: item.primary_image().map(str::to_string),
        stat_boost: item.stat_boost.clone(),
        evolved_from: None,
        evolved_abilities: Vec::new(),
        acquired_at: now,
    })
}
