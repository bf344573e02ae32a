//! Domain entities - records owned by exactly one user (or the shop catalogue)

mod custom_stat;
mod inventory_item;
mod power;
mod quest;
mod shop_item;
mod user;

pub use custom_stat::{CustomStat, CustomStatUpdate, NewCustomStat};
pub use inventory_item::{InventoryItem, QUEST_REWARD_ITEM_TYPE};
pub use power::{Power, PowerTier, PowerUpdate, DEFAULT_POWER_MAX_LEVEL};
pub use quest::{Difficulty, NewQuest, Quest, QuestUpdate, RepeatFrequency};
pub use shop_item::{ShopItem, ShopItemInput};
pub use user::{
    User, UserStat, STARTING_ABILITY_POINTS, STARTING_ATTRIBUTE, STARTING_GOLD, STARTING_HP,
    STARTING_LEVEL, STARTING_MP,
};
