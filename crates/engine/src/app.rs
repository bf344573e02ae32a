//! Application state and composition.

use std::sync::Arc;

use crate::entities::{CustomStats, Inventory, Powers, Quests, Shop, Users};
use crate::infrastructure::{
    ports::{ClockPort, RecordStore},
    user_locks::UserLocks,
};
use crate::use_cases::{
    self,
    custom_stats::CustomStatOps,
    inventory::{InventoryOps, UseItem},
    powers::{LevelUpPower, LinkEvolution, PowerOps, UnlinkEvolution},
    quests::{CheckFailures, CompleteQuest, ListQuests, QuestOps},
    shop::{PurchaseItem, ShopOps},
    users::UserOps,
};

/// Main application state.
///
/// Holds the store handle, the typed repositories over it and all use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    store: Arc<dyn RecordStore>,
}

/// Typed record access, one per collection.
pub struct Repositories {
    pub users: Arc<Users>,
    pub quests: Arc<Quests>,
    pub shop: Arc<Shop>,
    pub inventory: Arc<Inventory>,
    pub powers: Arc<Powers>,
    pub custom_stats: Arc<CustomStats>,
}

impl Repositories {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            users: Arc::new(Users::new(store.clone())),
            quests: Arc::new(Quests::new(store.clone())),
            shop: Arc::new(Shop::new(store.clone())),
            inventory: Arc::new(Inventory::new(store.clone())),
            powers: Arc::new(Powers::new(store.clone())),
            custom_stats: Arc::new(CustomStats::new(store)),
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub users: use_cases::UserUseCases,
    pub quests: use_cases::QuestUseCases,
    pub shop: use_cases::ShopUseCases,
    pub inventory: use_cases::InventoryUseCases,
    pub powers: use_cases::PowerUseCases,
    pub custom_stats: use_cases::CustomStatUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn ClockPort>, user_list_limit: usize) -> Self {
        let repositories = Repositories::new(store.clone());
        let locks = Arc::new(UserLocks::new());
        let r = &repositories;

        let users = use_cases::UserUseCases::new(Arc::new(UserOps::new(
            r.users.clone(),
            locks.clone(),
            clock.clone(),
            user_list_limit,
        )));

        let quests = use_cases::QuestUseCases::new(
            Arc::new(QuestOps::new(
                r.quests.clone(),
                r.users.clone(),
                locks.clone(),
                clock.clone(),
            )),
            Arc::new(ListQuests::new(r.quests.clone(), locks.clone(), clock.clone())),
            Arc::new(CompleteQuest::new(
                r.quests.clone(),
                r.users.clone(),
                r.custom_stats.clone(),
                locks.clone(),
                clock.clone(),
            )),
            Arc::new(CheckFailures::new(
                r.quests.clone(),
                r.users.clone(),
                r.custom_stats.clone(),
                locks.clone(),
                clock.clone(),
            )),
        );

        let shop = use_cases::ShopUseCases::new(
            Arc::new(ShopOps::new(r.shop.clone())),
            Arc::new(PurchaseItem::new(
                r.users.clone(),
                r.shop.clone(),
                r.inventory.clone(),
                locks.clone(),
                clock.clone(),
            )),
        );

        let inventory = use_cases::InventoryUseCases::new(
            Arc::new(InventoryOps::new(r.inventory.clone())),
            Arc::new(UseItem::new(r.users.clone(), r.inventory.clone(), locks.clone())),
        );

        let powers = use_cases::PowerUseCases::new(
            Arc::new(PowerOps::new(r.powers.clone(), locks.clone())),
            Arc::new(LevelUpPower::new(
                r.powers.clone(),
                r.users.clone(),
                r.shop.clone(),
                locks.clone(),
                clock.clone(),
            )),
            Arc::new(LinkEvolution::new(r.powers.clone(), locks.clone())),
            Arc::new(UnlinkEvolution::new(r.powers.clone(), locks.clone())),
        );

        let custom_stats = use_cases::CustomStatUseCases::new(Arc::new(CustomStatOps::new(
            r.custom_stats.clone(),
            r.users.clone(),
            locks,
            clock,
        )));

        Self {
            use_cases: UseCases {
                users,
                quests,
                shop,
                inventory,
                powers,
                custom_stats,
            },
            repositories,
            store,
        }
    }

    /// Release the store's connections. Call once the server has stopped.
    pub async fn close(&self) {
        self.store.close().await;
    }
}
