//! Spending ability points on powers, and the evolution that follows maxing one.

use chrono::{DateTime, Utc};

use crate::{
    DomainError, Power, PowerId, PowerLevelUpOutcome, ShopItem, User, DEFAULT_POWER_MAX_LEVEL,
};

/// Next-state records produced by leveling a power.
#[derive(Debug, Clone)]
pub struct PowerLevelUp {
    pub power: Power,
    pub user: User,
    /// Next-tier power unlocked when `power` reached its max level
    pub spawned: Option<Power>,
    pub outcome: PowerLevelUpOutcome,
}

/// Level `power` up by one at the cost of one ability point.
///
/// `next_tier_entry` is the shop entry named by the power's
/// `next_tier_ability`, if the shop has one. Without it the spawned power is
/// synthesized from the parent.
pub fn level_up_power(
    power: &Power,
    user: &User,
    next_tier_entry: Option<&ShopItem>,
    now: DateTime<Utc>,
) -> Result<PowerLevelUp, DomainError> {
    if power.user_id != user.id {
        return Err(DomainError::invalid_state("Power does not belong to this user"));
    }
    if power.is_maxed() {
        return Err(DomainError::invalid_state("Power is already at max level"));
    }
    if user.ability_points < 1 {
        return Err(DomainError::insufficient(
            "ability points",
            1,
            user.ability_points,
        ));
    }

    let mut power = power.clone();
    let mut user = user.clone();
    power.current_level += 1;
    user.ability_points -= 1;

    let spawned = match power.next_tier_ability.clone() {
        Some(ability) if power.is_maxed() => {
            let child = next_tier_power(&power, &ability, next_tier_entry, now);
            power.evolved_abilities.push(child.id);
            Some(child)
        }
        _ => None,
    };

    let outcome = PowerLevelUpOutcome {
        power_id: power.id,
        new_level: power.current_level,
        ability_points_remaining: user.ability_points,
        evolved_into: spawned.as_ref().map(|p| p.id),
    };

    Ok(PowerLevelUp {
        power,
        user,
        spawned,
        outcome,
    })
}

fn next_tier_power(
    parent: &Power,
    ability: &str,
    entry: Option<&ShopItem>,
    now: DateTime<Utc>,
) -> Power {
    let mut child = Power {
        id: PowerId::new(),
        user_id: parent.user_id,
        shop_item_id: parent.shop_item_id,
        name: ability.to_string(),
        description: format!("Advanced form of {}", parent.name),
        power_category: parent.power_category.clone(),
        power_subcategory: parent.power_subcategory.clone(),
        power_tier: parent.power_tier.next(),
        current_level: 1,
        max_level: DEFAULT_POWER_MAX_LEVEL,
        next_tier_ability: None,
        sub_abilities: Vec::new(),
        image: parent.image.clone(),
        stat_boost: parent.stat_boost.clone(),
        evolved_from: Some(parent.id),
        evolved_abilities: Vec::new(),
        acquired_at: now,
    };

    if let Some(entry) = entry.filter(|e| e.is_power) {
        child.shop_item_id = entry.id;
        child.description = entry.description.clone();
        if let Some(category) = &entry.power_category {
            child.power_category = category.clone();
        }
        if entry.power_subcategory.is_some() {
            child.power_subcategory = entry.power_subcategory.clone();
        }
        if let Some(tier) = entry.power_tier {
            child.power_tier = tier;
        }
        if let Some(max_level) = entry.power_max_level {
            child.max_level = max_level;
        }
        child.next_tier_ability = entry.next_tier_ability.clone();
        if let Some(image) = entry.primary_image() {
            child.image = Some(image.to_string());
        }
        if !entry.stat_boost.is_empty() {
            child.stat_boost = entry.stat_boost.clone();
        }
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PowerTier, ShopItemId};
    use std::collections::BTreeMap;

    fn power_of(user: &User, level: u32, max: u32, next: Option<&str>) -> Power {
        Power {
            id: PowerId::new(),
            user_id: user.id,
            shop_item_id: ShopItemId::new(),
            name: "Super Speed".to_string(),
            description: String::new(),
            power_category: "Physical Abilities".to_string(),
            power_subcategory: Some("Speed".to_string()),
            power_tier: PowerTier::Base,
            current_level: level,
            max_level: max,
            next_tier_ability: next.map(str::to_string),
            sub_abilities: Vec::new(),
            image: Some("speed.png".to_string()),
            stat_boost: BTreeMap::from([("vitality".to_string(), 1)]),
            evolved_from: None,
            evolved_abilities: Vec::new(),
            acquired_at: Utc::now(),
        }
    }

    #[test]
    fn level_up_costs_one_ability_point() {
        let user = User::new("Hero", Utc::now());
        let power = power_of(&user, 1, 5, None);

        let leveled = level_up_power(&power, &user, None, Utc::now()).unwrap();

        assert_eq!(leveled.power.current_level, 2);
        assert_eq!(leveled.user.ability_points, 4);
        assert_eq!(leveled.outcome.ability_points_remaining, 4);
        assert!(leveled.spawned.is_none());
    }

    #[test]
    fn maxed_power_is_rejected() {
        let user = User::new("Hero", Utc::now());
        let power = power_of(&user, 5, 5, None);
        let err = level_up_power(&power, &user, None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn no_ability_points_is_rejected() {
        let mut user = User::new("Hero", Utc::now());
        user.ability_points = 0;
        let power = power_of(&user, 1, 5, None);
        let err = level_up_power(&power, &user, None, Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::insufficient("ability points", 1, 0));
    }

    #[test]
    fn reaching_max_spawns_a_synthesized_next_tier() {
        let user = User::new("Hero", Utc::now());
        let power = power_of(&user, 4, 5, Some("Hyper Speed"));

        let leveled = level_up_power(&power, &user, None, Utc::now()).unwrap();

        let child = leveled.spawned.unwrap();
        assert_eq!(child.name, "Hyper Speed");
        assert_eq!(child.description, "Advanced form of Super Speed");
        assert_eq!(child.power_tier, PowerTier::PeakHuman);
        assert_eq!(child.current_level, 1);
        assert_eq!(child.max_level, DEFAULT_POWER_MAX_LEVEL);
        assert_eq!(child.image.as_deref(), Some("speed.png"));
        assert_eq!(child.evolved_from, Some(power.id));
        assert_eq!(leveled.power.evolved_abilities, vec![child.id]);
        assert_eq!(leveled.outcome.evolved_into, Some(child.id));
    }

    #[test]
    fn shop_entry_drives_the_next_tier_when_present() {
        let user = User::new("Hero", Utc::now());
        let power = power_of(&user, 2, 3, Some("Hyper Speed"));
        let entry = ShopItem {
            id: ShopItemId::new(),
            name: "Hyper Speed".to_string(),
            description: "Faster than sound".to_string(),
            price: 0,
            stock: None,
            category: "powers".to_string(),
            images: vec!["hyper.png".to_string()],
            is_power: true,
            power_category: Some("Physical Abilities".to_string()),
            power_subcategory: None,
            power_tier: Some(PowerTier::Superhuman),
            power_max_level: Some(8),
            next_tier_ability: Some("Light Speed".to_string()),
            stat_boost: BTreeMap::new(),
            item_type: "power".to_string(),
            exp_amount: None,
            gold_amount: None,
            ap_amount: None,
            is_synthesis_material: false,
        };

        let leveled = level_up_power(&power, &user, Some(&entry), Utc::now()).unwrap();

        let child = leveled.spawned.unwrap();
        assert_eq!(child.shop_item_id, entry.id);
        assert_eq!(child.power_tier, PowerTier::Superhuman);
        assert_eq!(child.max_level, 8);
        assert_eq!(child.next_tier_ability.as_deref(), Some("Light Speed"));
        assert_eq!(child.image.as_deref(), Some("hyper.png"));
        assert_eq!(child.power_subcategory.as_deref(), Some("Speed"));
        assert_eq!(child.stat_boost.get("vitality"), Some(&1));
    }

    #[test]
    fn maxing_without_next_tier_spawns_nothing() {
        let user = User::new("Hero", Utc::now());
        let power = power_of(&user, 4, 5, None);
        let leveled = level_up_power(&power, &user, None, Utc::now()).unwrap();
        assert!(leveled.power.is_maxed());
        assert!(leveled.spawned.is_none());
    }
}
