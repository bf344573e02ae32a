//! Shop catalogue and purchases.

mod error;
mod purchase_item;

use std::sync::Arc;

use questbound_domain::{ShopItem, ShopItemId, ShopItemInput};

use crate::entities::Shop;

pub use error::ShopError;
pub use purchase_item::{PurchaseItem, PurchaseRequest, PurchaseResult};

/// Container for shop use cases.
pub struct ShopUseCases {
    pub ops: Arc<ShopOps>,
    pub purchase: Arc<PurchaseItem>,
}

impl ShopUseCases {
    pub fn new(ops: Arc<ShopOps>, purchase: Arc<PurchaseItem>) -> Self {
        Self { ops, purchase }
    }
}

/// Catalogue management. The catalogue is global, not per user.
pub struct ShopOps {
    shop: Arc<Shop>,
}

impl ShopOps {
    pub fn new(shop: Arc<Shop>) -> Self {
        Self { shop }
    }

    pub async fn list(&self) -> Result<Vec<ShopItem>, ShopError> {
        Ok(self.shop.all().await?)
    }

    pub async fn create(&self, input: ShopItemInput) -> Result<ShopItem, ShopError> {
        let item = input.into_item(ShopItemId::new())?;
        self.shop.save(&item).await?;
        tracing::info!(item_id = %item.id, name = %item.name, price = item.price, "Created shop item");
        Ok(item)
    }

    /// Replace every catalogue field of an existing entry.
    pub async fn update(&self, item_id: ShopItemId, input: ShopItemInput) -> Result<ShopItem, ShopError> {
        let item = input.into_item(item_id)?;
        let item = self.shop.merge(item_id, &item).await?;
        tracing::info!(item_id = %item_id, "Updated shop item");
        Ok(item)
    }

    pub async fn delete(&self, item_id: ShopItemId) -> Result<(), ShopError> {
        self.shop.delete(item_id).await?;
        tracing::info!(item_id = %item_id, "Deleted shop item");
        Ok(())
    }

    /// Empty the catalogue. Returns how many entries were removed.
    pub async fn clear_all(&self) -> Result<u64, ShopError> {
        let removed = self.shop.delete_all().await?;
        tracing::warn!(removed, "Cleared shop catalogue");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::TestEnv;
    use questbound_domain::DomainError;
    use serde_json::json;

    fn input(name: &str, price: i64) -> ShopItemInput {
        serde_json::from_value(json!({
            "name": name,
            "price": price,
            "item_type": "potion",
            "stock": 3,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_list_and_delete() {
        let env = TestEnv::new();
        let ops = ShopOps::new(env.repos.shop.clone());

        let tonic = ops.create(input("Tonic", 25)).await.unwrap();
        let elixir = ops.create(input("Elixir", 80)).await.unwrap();
        assert_eq!(tonic.category, "general");
        assert_eq!(ops.list().await.unwrap(), vec![tonic.clone(), elixir]);

        ops.delete(tonic.id).await.unwrap();
        assert_eq!(ops.list().await.unwrap().len(), 1);
        let missing = ops.delete(tonic.id).await;
        assert!(matches!(missing, Err(ShopError::Repo(e)) if e.is_not_found()));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_the_id() {
        let env = TestEnv::new();
        let ops = ShopOps::new(env.repos.shop.clone());
        let tonic = ops.create(input("Tonic", 25)).await.unwrap();

        let mut replacement = input("Greater Tonic", 40);
        replacement.stock = None;
        let updated = ops.update(tonic.id, replacement).await.unwrap();

        assert_eq!(updated.id, tonic.id);
        assert_eq!(updated.name, "Greater Tonic");
        assert_eq!(updated.stock, None);
        assert_eq!(env.repos.shop.require(tonic.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_of_missing_item_is_not_found() {
        let env = TestEnv::new();
        let ops = ShopOps::new(env.repos.shop.clone());
        let result = ops.update(ShopItemId::new(), input("Ghost", 1)).await;
        assert!(matches!(result, Err(ShopError::Repo(e)) if e.is_not_found()));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let env = TestEnv::new();
        let ops = ShopOps::new(env.repos.shop.clone());
        let result = ops.create(input("Cursed", -5)).await;
        assert!(matches!(result, Err(ShopError::Domain(DomainError::Validation(_)))));
    }

    #[tokio::test]
    async fn clear_all_reports_the_count() {
        let env = TestEnv::new();
        let ops = ShopOps::new(env.repos.shop.clone());
        ops.create(input("A", 1)).await.unwrap();
        ops.create(input("B", 2)).await.unwrap();

        assert_eq!(ops.clear_all().await.unwrap(), 2);
        assert!(ops.list().await.unwrap().is_empty());
    }
}
