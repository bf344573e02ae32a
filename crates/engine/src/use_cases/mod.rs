//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area. Use cases load records
//! through the entity modules, run the pure progression rules from the domain
//! crate, and commit the resulting records in one batch.

pub mod custom_stats;
pub mod inventory;
pub mod powers;
pub mod quests;
pub mod shop;
pub mod users;

pub use custom_stats::CustomStatUseCases;
pub use inventory::InventoryUseCases;
pub use powers::PowerUseCases;
pub use quests::QuestUseCases;
pub use shop::ShopUseCases;
pub use users::UserUseCases;
