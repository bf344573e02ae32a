//! User entity - the player and their progression state

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

pub const STARTING_LEVEL: u32 = 1;
pub const STARTING_GOLD: i64 = 100;
pub const STARTING_ATTRIBUTE: i64 = 10;
pub const STARTING_ABILITY_POINTS: i64 = 5;
pub const STARTING_HP: i64 = 100;
pub const STARTING_MP: i64 = 50;

/// A player and their mutable progression record.
///
/// This is a data-carrying struct: the progression rules in
/// [`crate::progression`] take a `&User` and hand back the next state.
///
/// # Invariants (maintained by the progression rules)
///
/// - `0 <= xp < xp_for_level(level)` after any level normalization
/// - `ability_points >= 0`
/// - gold, xp and the core attributes never drop below zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub level: u32,
    pub xp: i64,
    pub gold: i64,
    pub strength: i64,
    pub intelligence: i64,
    pub vitality: i64,
    pub ability_points: i64,
    pub hp: i64,
    pub max_hp: i64,
    pub mp: i64,
    pub max_mp: i64,
    pub player_class: String,
    pub title: String,
    /// Power categories the user organizes their powers under
    /// (category name -> subcategory names)
    #[serde(default)]
    pub custom_categories: BTreeMap<String, Vec<String>>,
    /// Bumped by the record store on every committed write
    #[serde(default)]
    pub revision: u64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            level: STARTING_LEVEL,
            xp: 0,
            gold: STARTING_GOLD,
            strength: STARTING_ATTRIBUTE,
            intelligence: STARTING_ATTRIBUTE,
            vitality: STARTING_ATTRIBUTE,
            ability_points: STARTING_ABILITY_POINTS,
            hp: STARTING_HP,
            max_hp: STARTING_HP,
            mp: STARTING_MP,
            max_mp: STARTING_MP,
            player_class: "Adventurer".to_string(),
            title: "Novice".to_string(),
            custom_categories: BTreeMap::new(),
            revision: 0,
            created_at: now,
        }
    }

    /// Put level, xp, gold, attributes and ability points back to their
    /// starting values. HP/MP, class, title and categories are kept.
    pub fn reset_progression(&mut self) {
        self.level = STARTING_LEVEL;
        self.xp = 0;
        self.gold = STARTING_GOLD;
        self.strength = STARTING_ATTRIBUTE;
        self.intelligence = STARTING_ATTRIBUTE;
        self.vitality = STARTING_ATTRIBUTE;
        self.ability_points = STARTING_ABILITY_POINTS;
    }

    pub fn stat_mut(&mut self, stat: UserStat) -> &mut i64 {
        match stat {
            UserStat::Strength => &mut self.strength,
            UserStat::Intelligence => &mut self.intelligence,
            UserStat::Vitality => &mut self.vitality,
            UserStat::Hp => &mut self.hp,
            UserStat::MaxHp => &mut self.max_hp,
            UserStat::Mp => &mut self.mp,
            UserStat::MaxMp => &mut self.max_mp,
            UserStat::AbilityPoints => &mut self.ability_points,
        }
    }

    pub fn stat(&self, stat: UserStat) -> i64 {
        match stat {
            UserStat::Strength => self.strength,
            UserStat::Intelligence => self.intelligence,
            UserStat::Vitality => self.vitality,
            UserStat::Hp => self.hp,
            UserStat::MaxHp => self.max_hp,
            UserStat::Mp => self.mp,
            UserStat::MaxMp => self.max_mp,
            UserStat::AbilityPoints => self.ability_points,
        }
    }
}

/// Numeric user fields that shop stat boosts and quest attribute rewards may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserStat {
    Strength,
    Intelligence,
    Vitality,
    Hp,
    MaxHp,
    Mp,
    MaxMp,
    AbilityPoints,
}

impl UserStat {
    /// Resolve a stat-boost key. Unknown keys resolve to `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "strength" => Some(Self::Strength),
            "intelligence" => Some(Self::Intelligence),
            "vitality" => Some(Self::Vitality),
            "hp" => Some(Self::Hp),
            "max_hp" => Some(Self::MaxHp),
            "mp" => Some(Self::Mp),
            "max_mp" => Some(Self::MaxMp),
            "ability_points" => Some(Self::AbilityPoints),
            _ => None,
        }
    }

    /// The three attributes quests reward directly.
    pub fn core_attribute(name: &str) -> Option<Self> {
        match Self::from_key(name)? {
            stat @ (Self::Strength | Self::Intelligence | Self::Vitality) => Some(stat),
            _ => None,
        }
    }
}
