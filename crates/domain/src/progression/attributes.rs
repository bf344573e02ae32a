//! Routing attribute rewards and demerits to core attributes or custom stats.

use std::collections::BTreeMap;

use crate::{AttributeChange, CustomStat, User, UserStat};

/// Apply quest attribute rewards.
///
/// strength/intelligence/vitality add to the user directly. Any other name is
/// matched against `custom_stats` and fed through that stat's own leveling.
pub fn apply_attribute_rewards(
    user: &mut User,
    custom_stats: &mut [CustomStat],
    rewards: &BTreeMap<String, i64>,
) -> Vec<AttributeChange> {
    rewards
        .iter()
        .filter(|(_, amount)| **amount != 0)
        .map(|(name, &amount)| {
            if let Some(stat) = UserStat::core_attribute(name) {
                let value = user.stat_mut(stat);
                *value = value.saturating_add(amount).max(0);
                return AttributeChange::Core {
                    attribute: name.to_ascii_lowercase(),
                    amount,
                };
            }
            match custom_stats.iter_mut().find(|s| s.matches_name(name)) {
                Some(stat) => {
                    let levels_gained = stat.gain(amount);
                    AttributeChange::CustomStat {
                        stat_id: stat.id,
                        name: stat.name.clone(),
                        amount,
                        levels_gained,
                    }
                }
                None => AttributeChange::Unmatched {
                    name: name.clone(),
                    amount,
                },
            }
        })
        .collect()
}

/// Subtract attribute demerits, flooring every value at zero.
pub fn apply_attribute_demerits(
    user: &mut User,
    custom_stats: &mut [CustomStat],
    demerits: &BTreeMap<String, i64>,
) -> Vec<AttributeChange> {
    demerits
        .iter()
        .filter(|(_, amount)| **amount > 0)
        .map(|(name, &amount)| {
            if let Some(stat) = UserStat::core_attribute(name) {
                let value = user.stat_mut(stat);
                *value = value.saturating_sub(amount).max(0);
                return AttributeChange::Core {
                    attribute: name.to_ascii_lowercase(),
                    amount: -amount,
                };
            }
            match custom_stats.iter_mut().find(|s| s.matches_name(name)) {
                Some(stat) => {
                    stat.lose(amount);
                    AttributeChange::CustomStat {
                        stat_id: stat.id,
                        name: stat.name.clone(),
                        amount: -amount,
                        levels_gained: 0,
                    }
                }
                None => AttributeChange::Unmatched {
                    name: name.clone(),
                    amount: -amount,
                },
            }
        })
        .collect()
}
