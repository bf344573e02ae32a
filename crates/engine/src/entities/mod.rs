//! Entity modules - typed access to the record store.
//!
//! Each collection is a [`Records`] handle. Collection-specific lookups are
//! inherent impls on the concrete handle type.

mod records;
mod shop;
mod users;

pub use records::{Records, StoredRecord, UserOwned};

pub type Users = Records<questbound_domain::User>;
pub type Quests = Records<questbound_domain::Quest>;
pub type Shop = Records<questbound_domain::ShopItem>;
pub type Inventory = Records<questbound_domain::InventoryItem>;
pub type Powers = Records<questbound_domain::Power>;
pub type CustomStats = Records<questbound_domain::CustomStat>;
