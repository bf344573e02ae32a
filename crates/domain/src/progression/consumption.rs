//! Using up a consumable inventory item.

use super::leveling::apply_xp;
use crate::{ConsumeEffect, DomainError, InventoryItem, User};

/// Next user state after consuming an item. The item itself is always
/// deleted by the caller alongside the user update.
#[derive(Debug, Clone)]
pub struct Consumption {
    pub user: User,
    pub effect: ConsumeEffect,
}

/// Apply the single effect `item` grants.
///
/// `exp`, `gold` and `ability_points` items with a nonzero amount are
/// consumable; everything else is rejected.
pub fn consume_item(user: &User, item: &InventoryItem) -> Result<Consumption, DomainError> {
    if item.user_id != user.id {
        return Err(DomainError::invalid_state(
            "Inventory item does not belong to this user",
        ));
    }

    let mut user = user.clone();
    let nonzero = |amount: Option<i64>| amount.filter(|a| *a != 0);

    let effect = match item.item_type.as_str() {
        "exp" => nonzero(item.exp_amount).map(|amount| ConsumeEffect::Exp {
            exp_gained: amount,
            level_up: apply_xp(&mut user, amount),
        }),
        "gold" => nonzero(item.gold_amount).map(|amount| {
            user.gold = user.gold.saturating_add(amount).max(0);
            ConsumeEffect::Gold {
                gold_gained: amount,
            }
        }),
        "ability_points" => nonzero(item.ap_amount).map(|amount| {
            user.ability_points = user.ability_points.saturating_add(amount).max(0);
            ConsumeEffect::AbilityPoints { ap_gained: amount }
        }),
        _ => None,
    };

    let effect = effect.ok_or_else(|| {
        DomainError::invalid_state("Item is not consumable or has no effect")
    })?;
    Ok(Consumption { user, effect })
}
