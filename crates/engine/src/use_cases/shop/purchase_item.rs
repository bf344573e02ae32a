//! Buy a shop item.

use std::sync::Arc;

use questbound_domain::{
    progression::purchase_item, InventoryItem, Power, PurchaseReceipt, ShopItemId, User, UserId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::entities::{Inventory, Powers, Shop, Users};
use crate::infrastructure::ports::{ClockPort, WriteBatch};
use crate::infrastructure::user_locks::UserLocks;

use super::ShopError;

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub user_id: UserId,
    pub item_id: ShopItemId,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResult {
    pub user: User,
    pub inventory_item: InventoryItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
    pub receipt: PurchaseReceipt,
}

pub struct PurchaseItem {
    users: Arc<Users>,
    shop: Arc<Shop>,
    inventory: Arc<Inventory>,
    locks: Arc<UserLocks>,
    clock: Arc<dyn ClockPort>,
    /// Serializes purchases of stock-limited items across users.
    stock: Mutex<()>,
}

impl PurchaseItem {
    pub fn new(
        users: Arc<Users>,
        shop: Arc<Shop>,
        inventory: Arc<Inventory>,
        locks: Arc<UserLocks>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            users,
            shop,
            inventory,
            locks,
            clock,
            stock: Mutex::new(()),
        }
    }

    pub async fn execute(&self, request: PurchaseRequest) -> Result<PurchaseResult, ShopError> {
        let PurchaseRequest { user_id, item_id } = request;
        let _guard = self.locks.lock(user_id).await;

        let user = self.users.require(user_id).await?;
        let listed = self.shop.require(item_id).await?;
        let _stock_guard = match listed.stock {
            Some(_) => Some(self.stock.lock().await),
            None => None,
        };
        // Stock may have moved while waiting for the stock lock.
        let item = match listed.stock {
            Some(_) => self.shop.require(item_id).await?,
            None => listed,
        };

        let purchase = match purchase_item(&user, &item, self.clock.now()) {
            Ok(purchase) => purchase,
            Err(e) => {
                tracing::warn!(user_id = %user_id, item_id = %item_id, error = %e, "Purchase rejected");
                return Err(e.into());
            }
        };

        let mut batch = WriteBatch::new();
        if purchase.shop_item.stock.is_some() {
            Shop::stage(&mut batch, &purchase.shop_item)?;
        }
        Inventory::stage(&mut batch, &purchase.inventory_item)?;
        if let Some(power) = &purchase.power {
            Powers::stage(&mut batch, power)?;
        }
        let user = Users::stage_guarded(&mut batch, &purchase.user)?;
        self.inventory.commit(batch).await?;

        tracing::info!(
            user_id = %user_id,
            item_id = %item_id,
            price = purchase.receipt.price,
            power_granted = purchase.power.is_some(),
            "Purchased shop item"
        );
        if !purchase.receipt.ignored_boosts.is_empty() {
            tracing::debug!(
                item_id = %item_id,
                ignored = ?purchase.receipt.ignored_boosts,
                "Stat boosts without a matching user field"
            );
        }

        Ok(PurchaseResult {
            user,
            inventory_item: purchase.inventory_item,
            power: purchase.power,
            receipt: purchase.receipt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{shop_item, TestEnv};
    use questbound_domain::DomainError;
    use std::collections::BTreeMap;

    fn use_case(env: &TestEnv) -> PurchaseItem {
        PurchaseItem::new(
            env.repos.users.clone(),
            env.repos.shop.clone(),
            env.repos.inventory.clone(),
            env.locks.clone(),
            env.clock.clone(),
        )
    }

    #[tokio::test]
    async fn purchase_deducts_gold_applies_boosts_and_fills_inventory() {
        let env = TestEnv::new();
        let user = env.user("Hero").await;
        let mut sword = shop_item("Iron Sword", 60, "weapon");
        sword.stock = Some(2);
        sword.stat_boost = BTreeMap::from([("strength".to_string(), 3), ("luck".to_string(), 1)]);
        let sword = env.shop_item(sword).await;

        let result = use_case(&env)
            .execute(PurchaseRequest {
                user_id: user.id,
                item_id: sword.id,
            })
            .await
            .unwrap();

        assert_eq!(result.user.gold, user.gold - 60);
        assert_eq!(result.user.strength, user.strength + 3);
        assert_eq!(result.receipt.ignored_boosts, vec!["luck".to_string()]);
        assert!(result.power.is_none());

        assert_eq!(env.repos.shop.require(sword.id).await.unwrap().stock, Some(1));
        assert_eq!(env.repos.users.require(user.id).await.unwrap(), result.user);
        let inventory = env.repos.inventory.list_for_user(user.id).await.unwrap();
        assert_eq!(inventory, vec![result.inventory_item]);
    }

    #[tokio::test]
    async fn power_items_grant_a_power() {
        let env = TestEnv::new();
        let user = env.user("Hero").await;
        let mut item = shop_item("Fireball", 40, "power");
        item.is_power = true;
        item.power_category = Some("Elemental".to_string());
        let item = env.shop_item(item).await;

        let result = use_case(&env)
            .execute(PurchaseRequest {
                user_id: user.id,
                item_id: item.id,
            })
            .await
            .unwrap();

        let power = result.power.unwrap();
        assert_eq!(power.current_level, 1);
        assert_eq!(power.shop_item_id, item.id);
        assert_eq!(env.repos.powers.list_for_user(user.id).await.unwrap(), vec![power]);
    }

    #[tokio::test]
    async fn insufficient_gold_changes_nothing() {
        let env = TestEnv::new();
        let user = env.user("Hero").await;
        let crown = env.shop_item(shop_item("Crown", 1_000, "accessory")).await;

        let result = use_case(&env)
            .execute(PurchaseRequest {
                user_id: user.id,
                item_id: crown.id,
            })
            .await;

        assert!(matches!(
            result,
            Err(ShopError::Domain(DomainError::InsufficientResource { resource: "gold", .. }))
        ));
        assert_eq!(env.repos.users.require(user.id).await.unwrap(), user);
        assert!(env.repos.inventory.list_for_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sold_out_items_cannot_be_bought() {
        let env = TestEnv::new();
        let user = env.user("Hero").await;
        let mut rare = shop_item("Rare Gem", 10, "accessory");
        rare.stock = Some(0);
        let rare = env.shop_item(rare).await;

        let result = use_case(&env)
            .execute(PurchaseRequest {
                user_id: user.id,
                item_id: rare.id,
            })
            .await;

        assert!(matches!(
            result,
            Err(ShopError::Domain(DomainError::InsufficientResource { resource: "stock", .. }))
        ));
    }

    #[tokio::test]
    async fn last_item_goes_to_exactly_one_buyer() {
        let env = TestEnv::new();
        let hero = env.user("Hero").await;
        let rival = env.user("Rival").await;
        let mut last = shop_item("Last Potion", 10, "potion");
        last.stock = Some(1);
        let last = env.shop_item(last).await;
        let purchase = Arc::new(use_case(&env));

        let (a, b) = tokio::join!(
            purchase.execute(PurchaseRequest {
                user_id: hero.id,
                item_id: last.id,
            }),
            purchase.execute(PurchaseRequest {
                user_id: rival.id,
                item_id: last.id,
            }),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(env.repos.shop.require(last.id).await.unwrap().stock, Some(0));
    }
}
