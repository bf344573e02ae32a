//! Consume an inventory item.

use std::sync::Arc;

use questbound_domain::{
    progression::consume_item, ConsumeEffect, DomainError, InventoryItemId, User, UserId,
};
use serde::{Deserialize, Serialize};

use crate::entities::{Inventory, Users};
use crate::infrastructure::ports::WriteBatch;
use crate::infrastructure::user_locks::UserLocks;

use super::InventoryError;

#[derive(Debug, Clone, Deserialize)]
pub struct UseItemRequest {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct UseItemResult {
    pub user: User,
    #[serde(flatten)]
    pub effect: ConsumeEffect,
}

pub struct UseItem {
    users: Arc<Users>,
    inventory: Arc<Inventory>,
    locks: Arc<UserLocks>,
}

impl UseItem {
    pub fn new(users: Arc<Users>, inventory: Arc<Inventory>, locks: Arc<UserLocks>) -> Self {
        Self {
            users,
            inventory,
            locks,
        }
    }

    pub async fn execute(
        &self,
        item_id: InventoryItemId,
        request: UseItemRequest,
    ) -> Result<UseItemResult, InventoryError> {
        let user_id = request.user_id;
        let _guard = self.locks.lock(user_id).await;

        let item = match self.inventory.get(item_id).await? {
            Some(item) if item.user_id == user_id => item,
            _ => return Err(DomainError::not_found("Inventory item", item_id).into()),
        };
        let user = self.users.require(user_id).await?;

        let consumption = match consume_item(&user, &item) {
            Ok(consumption) => consumption,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    item_id = %item_id,
                    item_type = %item.item_type,
                    error = %e,
                    "Item use rejected"
                );
                return Err(e.into());
            }
        };

        let mut batch = WriteBatch::new();
        Inventory::stage_delete(&mut batch, &item);
        let user = Users::stage_guarded(&mut batch, &consumption.user)?;
        self.users.commit(batch).await?;

        tracing::info!(
            user_id = %user_id,
            item_id = %item_id,
            effect = ?consumption.effect,
            "Used inventory item"
        );
        Ok(UseItemResult {
            user,
            effect: consumption.effect,
        })
    }
}
