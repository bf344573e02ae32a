//! Custom stat entity - user-defined stat bars with their own leveling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CustomStatId, DomainError, UserId};

/// A user-defined stat bar (e.g. "Focus", "Creativity").
///
/// Levels independently of the user: when `current` fills `max`, the stat
/// levels up, keeps the overflow, and its `max` grows by 10%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomStat {
    pub id: CustomStatId,
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    pub current: i64,
    pub max: i64,
    pub level: u32,
    #[serde(default)]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CustomStat {
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }

    /// Add to the bar, leveling up for every full bar. Returns levels gained.
    pub fn gain(&mut self, amount: i64) -> u32 {
        self.current = self.current.saturating_add(amount).max(0);
        let mut levels_gained = 0;
        while self.max > 0 && self.current >= self.max {
            self.current -= self.max;
            self.level = self.level.saturating_add(1);
            self.max = grown_max(self.max);
            levels_gained += 1;
        }
        levels_gained
    }

    /// Drain the bar, floored at zero. Levels are never lost.
    pub fn lose(&mut self, amount: i64) {
        self.current = self.current.saturating_sub(amount).max(0);
    }
}

/// +10%, and always at least +1 so small bars still grow.
fn grown_max(max: i64) -> i64 {
    max.saturating_add(max / 10).max(max.saturating_add(1))
}

/// Input for creating a custom stat.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomStat {
    pub name: String,
    pub color: String,
    pub current: i64,
    pub max: i64,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl NewCustomStat {
    pub fn into_stat(self, user_id: UserId, now: DateTime<Utc>) -> Result<CustomStat, DomainError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Custom stat name cannot be empty"));
        }
        if self.max <= 0 {
            return Err(DomainError::validation("Custom stat max must be positive"));
        }
        Ok(CustomStat {
            id: CustomStatId::new(),
            user_id,
            name,
            color: self.color,
            current: self.current.max(0),
            max: self.max,
            level: self.level.unwrap_or(1).max(1),
            icon: self.icon,
            created_at: now,
        })
    }
}

/// Allow-listed fields a custom stat edit may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomStatUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub current: Option<i64>,
    pub max: Option<i64>,
    pub icon: Option<String>,
}

impl CustomStatUpdate {
    pub fn apply(self, stat: &mut CustomStat) -> Result<(), DomainError> {
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("Custom stat name cannot be empty"));
            }
            stat.name = name;
        }
        if let Some(max) = self.max {
            if max <= 0 {
                return Err(DomainError::validation("Custom stat max must be positive"));
            }
            stat.max = max;
        }
        if let Some(color) = self.color {
            stat.color = color;
        }
        if let Some(current) = self.current {
            stat.current = current.max(0);
        }
        if self.icon.is_some() {
            stat.icon = self.icon;
        }
        Ok(())
    }
}
