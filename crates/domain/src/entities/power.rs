//! Power entity - upgradeable abilities unlocked from the shop

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, PowerId, ShopItemId, UserId};

pub const DEFAULT_POWER_MAX_LEVEL: u32 = 5;

/// Named progression stage of a power.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerTier {
    #[default]
    Base,
    #[serde(rename = "Peak Human")]
    PeakHuman,
    Enhanced,
    Superhuman,
    Absolute,
}

impl PowerTier {
    /// The tier a maxed-out power evolves into. Absolute is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Base => Self::PeakHuman,
            Self::PeakHuman => Self::Enhanced,
            Self::Enhanced => Self::Superhuman,
            Self::Superhuman | Self::Absolute => Self::Absolute,
        }
    }
}

impl std::fmt::Display for PowerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => write!(f, "Base"),
            Self::PeakHuman => write!(f, "Peak Human"),
            Self::Enhanced => write!(f, "Enhanced"),
            Self::Superhuman => write!(f, "Superhuman"),
            Self::Absolute => write!(f, "Absolute"),
        }
    }
}

/// A power owned by one user.
///
/// `evolved_from` / `evolved_abilities` describe a forest: every power has at
/// most one parent and the parent chain never loops back on itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Power {
    pub id: PowerId,
    pub user_id: UserId,
    pub shop_item_id: ShopItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub power_category: String,
    #[serde(default)]
    pub power_subcategory: Option<String>,
    #[serde(default)]
    pub power_tier: PowerTier,
    pub current_level: u32,
    pub max_level: u32,
    #[serde(default)]
    pub next_tier_ability: Option<String>,
    #[serde(default)]
    pub sub_abilities: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stat_boost: BTreeMap<String, i64>,
    #[serde(default)]
    pub evolved_from: Option<PowerId>,
    #[serde(default)]
    pub evolved_abilities: Vec<PowerId>,
    pub acquired_at: DateTime<Utc>,
}

impl Power {
    pub fn is_maxed(&self) -> bool {
        self.current_level >= self.max_level
    }

    /// Whether the next level-up completes this power and unlocks its next tier.
    pub fn evolves_on_next_level(&self) -> bool {
        !self.is_maxed()
            && self.current_level + 1 >= self.max_level
            && self.next_tier_ability.is_some()
    }
}

/// Allow-listed fields a power edit may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PowerUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_level: Option<u32>,
    pub sub_abilities: Option<Vec<String>>,
}

impl PowerUpdate {
    pub fn apply(self, power: &mut Power) -> Result<(), DomainError> {
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("Power name cannot be empty"));
            }
            power.name = name;
        }
        if let Some(max_level) = self.max_level {
            if max_level == 0 {
                return Err(DomainError::validation("Power max level must be at least 1"));
            }
            power.max_level = max_level;
        }
        if let Some(description) = self.description {
            power.description = description;
        }
        if let Some(sub_abilities) = self.sub_abilities {
            power.sub_abilities = sub_abilities;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power(level: u32, max: u32, next: Option<&str>) -> Power {
        Power {
            id: PowerId::new(),
            user_id: UserId::new(),
            shop_item_id: ShopItemId::new(),
            name: "Strength".to_string(),
            description: String::new(),
            power_category: "Physical Abilities".to_string(),
            power_subcategory: None,
            power_tier: PowerTier::Base,
            current_level: level,
            max_level: max,
            next_tier_ability: next.map(str::to_string),
            sub_abilities: Vec::new(),
            image: None,
            stat_boost: BTreeMap::new(),
            evolved_from: None,
            evolved_abilities: Vec::new(),
            acquired_at: Utc::now(),
        }
    }

    #[test]
    fn tier_names_match_display_names() {
        let json = serde_json::to_string(&PowerTier::PeakHuman).unwrap();
        assert_eq!(json, "\"Peak Human\"");
        assert_eq!(PowerTier::PeakHuman.to_string(), "Peak Human");
    }

    #[test]
    fn tiers_advance_and_stop_at_absolute() {
        assert_eq!(PowerTier::Base.next(), PowerTier::PeakHuman);
        assert_eq!(PowerTier::Superhuman.next(), PowerTier::Absolute);
        assert_eq!(PowerTier::Absolute.next(), PowerTier::Absolute);
    }

    #[test]
    fn evolves_only_on_the_final_level_with_a_next_tier() {
        assert!(power(4, 5, Some("Peak Strength")).evolves_on_next_level());
        assert!(!power(3, 5, Some("Peak Strength")).evolves_on_next_level());
        assert!(!power(4, 5, None).evolves_on_next_level());
        assert!(!power(5, 5, Some("Peak Strength")).evolves_on_next_level());
    }

    #[test]
    fn update_rejects_zero_max_level() {
        let mut p = power(1, 5, None);
        let update = PowerUpdate {
            max_level: Some(0),
            ..Default::default()
        };
        assert!(update.apply(&mut p).is_err());
        assert_eq!(p.max_level, 5);
    }
}
