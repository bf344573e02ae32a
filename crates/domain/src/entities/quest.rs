//! Quest entity - tasks a user completes for rewards

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, QuestId, UserId};

/// How often a quest becomes completable again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatFrequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    /// Never terminally completed; always available again
    Limitless,
}

impl RepeatFrequency {
    /// Daily, weekly and monthly quests reset on a calendar window.
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Daily | Self::Weekly | Self::Monthly)
    }
}

/// Preset difficulty used to derive rewards when none are given.
///
/// Parsing ignores case; unrecognized labels become `Custom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Custom,
}

impl From<String> for Difficulty {
    fn from(label: String) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Custom,
        }
    }
}

impl Difficulty {
    /// Default (xp, gold) rewards for this difficulty.
    pub fn default_rewards(self) -> (i64, i64) {
        match self {
            Self::Easy => (50, 10),
            Self::Medium => (100, 25),
            Self::Hard => (200, 50),
            Self::Custom => (50, 10),
        }
    }
}

/// A quest owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub xp_reward: i64,
    pub gold_reward: i64,
    #[serde(default)]
    pub ap_reward: i64,
    #[serde(default)]
    pub item_reward: Option<String>,
    /// Attribute name -> amount. Core attributes apply to the user directly,
    /// anything else is matched against the user's custom stats.
    #[serde(default)]
    pub attribute_rewards: BTreeMap<String, i64>,
    #[serde(default)]
    pub repeat_frequency: RepeatFrequency,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub has_deadline: bool,
    /// UTC time of day the quest must be done by
    #[serde(default, with = "deadline_format")]
    pub deadline: Option<NaiveTime>,
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Quest {
    pub fn is_limitless(&self) -> bool {
        self.repeat_frequency == RepeatFrequency::Limitless
    }

    /// The deadline instant on the UTC day of `now`, if the quest has one.
    pub fn deadline_on(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.has_deadline {
            return None;
        }
        self.deadline
            .map(|time| now.date_naive().and_time(time).and_utc())
    }
}

/// Input for creating a quest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewQuest {
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub xp_reward: Option<i64>,
    #[serde(default)]
    pub gold_reward: Option<i64>,
    #[serde(default)]
    pub ap_reward: Option<i64>,
    #[serde(default)]
    pub item_reward: Option<String>,
    #[serde(default)]
    pub attribute_rewards: Option<BTreeMap<String, i64>>,
    #[serde(default)]
    pub repeat_frequency: Option<RepeatFrequency>,
    #[serde(default, with = "deadline_format")]
    pub deadline: Option<NaiveTime>,
}

impl NewQuest {
    /// Build the quest record, deriving missing rewards from the difficulty.
    pub fn into_quest(self, now: DateTime<Utc>) -> Result<Quest, DomainError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation("Quest title cannot be empty"));
        }

        let difficulty = self.difficulty.unwrap_or_default();
        let (default_xp, default_gold) = difficulty.default_rewards();
        let xp_reward = self.xp_reward.unwrap_or(default_xp);
        let gold_reward = self.gold_reward.unwrap_or(default_gold);
        let ap_reward = self.ap_reward.unwrap_or(0);
        validate_rewards(xp_reward, gold_reward, ap_reward)?;

        Ok(Quest {
            id: QuestId::new(),
            user_id: self.user_id,
            title,
            description: self.description,
            difficulty,
            xp_reward,
            gold_reward,
            ap_reward,
            item_reward: non_blank(self.item_reward),
            attribute_rewards: self.attribute_rewards.unwrap_or_default(),
            repeat_frequency: self.repeat_frequency.unwrap_or_default(),
            completed: false,
            failed: false,
            has_deadline: self.deadline.is_some(),
            deadline: self.deadline,
            last_completed: None,
            completed_at: None,
            failed_at: None,
            created_at: now,
        })
    }
}

/// Allow-listed fields a quest edit may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub xp_reward: Option<i64>,
    pub gold_reward: Option<i64>,
    pub ap_reward: Option<i64>,
    pub item_reward: Option<String>,
    pub attribute_rewards: Option<BTreeMap<String, i64>>,
    pub repeat_frequency: Option<RepeatFrequency>,
    #[serde(default, with = "deadline_format")]
    pub deadline: Option<NaiveTime>,
    /// Explicitly drop the deadline
    #[serde(default)]
    pub clear_deadline: bool,
}

impl QuestUpdate {
    pub fn apply(self, quest: &mut Quest) -> Result<(), DomainError> {
        if let Some(title) = self.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(DomainError::validation("Quest title cannot be empty"));
            }
            quest.title = title;
        }
        validate_rewards(
            self.xp_reward.unwrap_or(quest.xp_reward),
            self.gold_reward.unwrap_or(quest.gold_reward),
            self.ap_reward.unwrap_or(quest.ap_reward),
        )?;

        if let Some(description) = self.description {
            quest.description = description;
        }
        if let Some(xp) = self.xp_reward {
            quest.xp_reward = xp;
        }
        if let Some(gold) = self.gold_reward {
            quest.gold_reward = gold;
        }
        if let Some(ap) = self.ap_reward {
            quest.ap_reward = ap;
        }
        if self.item_reward.is_some() {
            quest.item_reward = non_blank(self.item_reward);
        }
        if let Some(rewards) = self.attribute_rewards {
            quest.attribute_rewards = rewards;
        }
        if let Some(frequency) = self.repeat_frequency {
            quest.repeat_frequency = frequency;
        }
        if self.clear_deadline {
            quest.has_deadline = false;
            quest.deadline = None;
        } else if let Some(deadline) = self.deadline {
            quest.has_deadline = true;
            quest.deadline = Some(deadline);
        }
        Ok(())
    }
}

fn validate_rewards(xp: i64, gold: i64, ap: i64) -> Result<(), DomainError> {
    if xp < 0 || gold < 0 || ap < 0 {
        return Err(DomainError::validation("Quest rewards cannot be negative"));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Deadlines travel as "HH:MM" (seconds accepted on input).
mod deadline_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid deadline '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_quest(title: &str) -> NewQuest {
        NewQuest {
            user_id: UserId::new(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rewards_default_from_difficulty() {
        let now = Utc::now();
        let mut input = new_quest("Run 5k");
        input.difficulty = Some(Difficulty::Hard);
        let quest = input.into_quest(now).unwrap();
        assert_eq!((quest.xp_reward, quest.gold_reward), (200, 50));

        let quest = new_quest("Stretch").into_quest(now).unwrap();
        assert_eq!(quest.difficulty, Difficulty::Custom);
        assert_eq!((quest.xp_reward, quest.gold_reward), (50, 10));
    }

    #[test]
    fn difficulty_labels_ignore_case() {
        let input: NewQuest = serde_json::from_value(serde_json::json!({
            "user_id": UserId::new(),
            "title": "Deadlift",
            "difficulty": "Medium",
        }))
        .unwrap();
        let quest = input.into_quest(Utc::now()).unwrap();

        assert_eq!(quest.difficulty, Difficulty::Medium);
        assert_eq!((quest.xp_reward, quest.gold_reward), (100, 25));
        assert_eq!(serde_json::to_value(quest.difficulty).unwrap(), "medium");

        let parsed: Difficulty = serde_json::from_str("\"HARD\"").unwrap();
        assert_eq!(parsed, Difficulty::Hard);
        let parsed: Difficulty = serde_json::from_str("\"legendary\"").unwrap();
        assert_eq!(parsed, Difficulty::Custom);
    }

    #[test]
    fn explicit_rewards_win_over_difficulty() {
        let mut input = new_quest("Read");
        input.difficulty = Some(Difficulty::Medium);
        input.xp_reward = Some(75);
        let quest = input.into_quest(Utc::now()).unwrap();
        assert_eq!(quest.xp_reward, 75);
        assert_eq!(quest.gold_reward, 25);
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = new_quest("   ").into_quest(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn unknown_difficulty_parses_as_custom() {
        let parsed: Difficulty = serde_json::from_str("\"legendary\"").unwrap();
        assert_eq!(parsed, Difficulty::Custom);
    }

    #[test]
    fn deadline_round_trips_as_hours_and_minutes() {
        let mut input = new_quest("Meditate");
        input.deadline = NaiveTime::from_hms_opt(9, 30, 0);
        let quest = input.into_quest(Utc::now()).unwrap();
        assert!(quest.has_deadline);

        let json = serde_json::to_value(&quest).unwrap();
        assert_eq!(json["deadline"], "09:30");
        let back: Quest = serde_json::from_value(json).unwrap();
        assert_eq!(back.deadline, NaiveTime::from_hms_opt(9, 30, 0));
    }

    #[test]
    fn deadline_on_uses_the_current_utc_day() {
        let mut quest = new_quest("Journal").into_quest(Utc::now()).unwrap();
        quest.has_deadline = true;
        quest.deadline = NaiveTime::from_hms_opt(21, 0, 0);

        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        assert_eq!(
            quest.deadline_on(now),
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 21, 0, 0).unwrap())
        );

        quest.has_deadline = false;
        assert_eq!(quest.deadline_on(now), None);
    }

    #[test]
    fn update_only_touches_given_fields() {
        let mut quest = new_quest("Run").into_quest(Utc::now()).unwrap();
        let update = QuestUpdate {
            gold_reward: Some(99),
            repeat_frequency: Some(RepeatFrequency::Daily),
            ..Default::default()
        };
        update.apply(&mut quest).unwrap();
        assert_eq!(quest.title, "Run");
        assert_eq!(quest.gold_reward, 99);
        assert_eq!(quest.repeat_frequency, RepeatFrequency::Daily);
    }

    #[test]
    fn update_rejects_negative_rewards() {
        let mut quest = new_quest("Run").into_quest(Utc::now()).unwrap();
        let update = QuestUpdate {
            xp_reward: Some(-5),
            ..Default::default()
        };
        assert!(update.apply(&mut quest).is_err());
        assert_eq!(quest.xp_reward, 50);
    }
}
