//! Questbound domain: records, ids and the progression rules.
//!
//! Pure and synchronous. Storage, locking and transport live in
//! `questbound-engine`.

pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod progression;

pub use entities::{
    CustomStat, CustomStatUpdate, Difficulty, InventoryItem, NewCustomStat, NewQuest, Power,
    PowerTier, PowerUpdate, Quest, QuestUpdate, RepeatFrequency, ShopItem, ShopItemInput, User,
    UserStat, DEFAULT_POWER_MAX_LEVEL, QUEST_REWARD_ITEM_TYPE, STARTING_ABILITY_POINTS,
    STARTING_ATTRIBUTE, STARTING_GOLD, STARTING_HP, STARTING_LEVEL, STARTING_MP,
};
pub use error::DomainError;
pub use events::{
    AttributeChange, ConsumeEffect, DemeritTotals, FailureReport, LevelUpOutcome,
    PowerLevelUpOutcome, PurchaseReceipt, QuestDemerit, RewardSummary,
};
pub use ids::{CustomStatId, InventoryItemId, PowerId, QuestId, ShopItemId, UserId};
