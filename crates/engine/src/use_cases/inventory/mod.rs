//! Inventory use cases.

mod error;
mod use_item;

use std::sync::Arc;

use questbound_domain::{InventoryItem, InventoryItemId, UserId};

use crate::entities::Inventory;

pub use error::InventoryError;
pub use use_item::{UseItem, UseItemRequest, UseItemResult};

/// Container for inventory use cases.
pub struct InventoryUseCases {
    pub ops: Arc<InventoryOps>,
    pub use_item: Arc<UseItem>,
}

impl InventoryUseCases {
    pub fn new(ops: Arc<InventoryOps>, use_item: Arc<UseItem>) -> Self {
        Self { ops, use_item }
    }
}

pub struct InventoryOps {
    inventory: Arc<Inventory>,
}

impl InventoryOps {
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self { inventory }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<InventoryItem>, InventoryError> {
        Ok(self.inventory.list_for_user(user_id).await?)
    }

    pub async fn delete(&self, item_id: InventoryItemId) -> Result<(), InventoryError> {
        self.inventory.delete(item_id).await?;
        tracing::info!(item_id = %item_id, "Deleted inventory item");
        Ok(())
    }
}
