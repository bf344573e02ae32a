//! Common test helpers: a fixed clock and an in-memory store wired into
//! [`Repositories`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use questbound_domain::{
    CustomStat, CustomStatId, NewQuest, Power, PowerId, PowerTier, Quest, ShopItem, ShopItemId,
    User,
};

use crate::app::Repositories;
use crate::infrastructure::{
    clock::FixedClock,
    memory::InMemoryRecordStore,
    ports::{ClockPort, RecordStore},
    user_locks::UserLocks,
};

/// 2024-05-01 12:00:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub struct TestEnv {
    pub store: Arc<dyn RecordStore>,
    pub clock: Arc<dyn ClockPort>,
    pub locks: Arc<UserLocks>,
    pub repos: Repositories,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::at(fixed_now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        Self {
            repos: Repositories::new(store.clone()),
            store,
            clock: Arc::new(FixedClock(now)),
            locks: Arc::new(UserLocks::new()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn user(&self, username: &str) -> User {
        let user = User::new(username, self.now());
        self.repos.users.save(&user).await.unwrap();
        user
    }

    pub async fn quest(&self, quest: NewQuest) -> Quest {
        let quest = quest.into_quest(self.now()).unwrap();
        self.repos.quests.save(&quest).await.unwrap();
        quest
    }

    pub async fn shop_item(&self, item: ShopItem) -> ShopItem {
        self.repos.shop.save(&item).await.unwrap();
        item
    }

    pub async fn power(&self, power: Power) -> Power {
        self.repos.powers.save(&power).await.unwrap();
        power
    }

    pub async fn custom_stat(&self, user: &User, name: &str, current: i64, max: i64) -> CustomStat {
        let stat = CustomStat {
            id: CustomStatId::new(),
            user_id: user.id,
            name: name.to_string(),
            color: "#8b5cf6".to_string(),
            current,
            max,
            level: 1,
            icon: None,
            created_at: self.now(),
        };
        self.repos.custom_stats.save(&stat).await.unwrap();
        stat
    }
}

pub fn shop_item(name: &str, price: i64, item_type: &str) -> ShopItem {
    ShopItem {
        id: ShopItemId::new(),
        name: name.to_string(),
        description: format!("{name} from the shop"),
        price,
        stock: None,
        category: "general".to_string(),
        images: Vec::new(),
        is_power: false,
        power_category: None,
        power_subcategory: None,
        power_tier: None,
        power_max_level: None,
        next_tier_ability: None,
        stat_boost: BTreeMap::new(),
        item_type: item_type.to_string(),
        exp_amount: None,
        gold_amount: None,
        ap_amount: None,
        is_synthesis_material: false,
    }
}

pub fn power_for(user: &User, name: &str, level: u32, max_level: u32) -> Power {
    Power {
        id: PowerId::new(),
        user_id: user.id,
        shop_item_id: ShopItemId::new(),
        name: name.to_string(),
        description: String::new(),
        power_category: "Physical Abilities".to_string(),
        power_subcategory: None,
        power_tier: PowerTier::Base,
        current_level: level,
        max_level,
        next_tier_ability: None,
        sub_abilities: Vec::new(),
        image: None,
        stat_boost: BTreeMap::new(),
        evolved_from: None,
        evolved_abilities: Vec::new(),
        acquired_at: fixed_now(),
    }
}
