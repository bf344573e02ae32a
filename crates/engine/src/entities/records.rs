//! Typed access to one record collection.

use std::marker::PhantomData;
use std::sync::Arc;

use questbound_domain::{CustomStat, InventoryItem, Power, Quest, ShopItem, User, UserId};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::infrastructure::ports::{Collection, RecordFilter, RecordStore, RepoError, WriteBatch};

/// A domain record stored as a JSON document.
pub trait StoredRecord: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;
    const ENTITY: &'static str;

    fn record_id(&self) -> String;
}

/// Records owned by a single user, listable by `user_id`.
pub trait UserOwned: StoredRecord {
    fn owner(&self) -> UserId;
}

macro_rules! stored_record {
    ($ty:ty, $collection:expr, $entity:literal) => {
        impl StoredRecord for $ty {
            const COLLECTION: Collection = $collection;
            const ENTITY: &'static str = $entity;

            fn record_id(&self) -> String {
                self.id.to_string()
            }
        }
    };
    ($ty:ty, $collection:expr, $entity:literal, owned) => {
        stored_record!($ty, $collection, $entity);

        impl UserOwned for $ty {
            fn owner(&self) -> UserId {
                self.user_id
            }
        }
    };
}

stored_record!(User, Collection::Users, "User");
stored_record!(Quest, Collection::Quests, "Quest", owned);
stored_record!(ShopItem, Collection::ShopItems, "Shop item");
stored_record!(InventoryItem, Collection::Inventory, "Inventory item", owned);
stored_record!(Power, Collection::Powers, "Power", owned);
stored_record!(CustomStat, Collection::CustomStats, "Custom stat", owned);

pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T, RepoError> {
    serde_json::from_value(body).map_err(|e| RepoError::serialization(e))
}

/// Collection handle for `T`.
pub struct Records<T> {
    store: Arc<dyn RecordStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T: StoredRecord> Records<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn get(&self, id: impl ToString) -> Result<Option<T>, RepoError> {
        self.store
            .get(T::COLLECTION, &id.to_string())
            .await?
            .map(decode)
            .transpose()
    }

    /// Like [`Records::get`], but a missing record is `RepoError::NotFound`.
    pub async fn require(&self, id: impl ToString) -> Result<T, RepoError> {
        let id = id.to_string();
        self.get(&id)
            .await?
            .ok_or_else(|| RepoError::not_found(T::ENTITY, id))
    }

    pub async fn find(&self, filter: &RecordFilter) -> Result<Vec<T>, RepoError> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn all(&self) -> Result<Vec<T>, RepoError> {
        self.find(&RecordFilter::all()).await
    }

    pub async fn save(&self, record: &T) -> Result<(), RepoError> {
        let body = serde_json::to_value(record).map_err(|e| RepoError::serialization(e))?;
        self.store
            .put(T::COLLECTION, &record.record_id(), &body)
            .await
    }

    /// Merge the serialized `partial` into the stored record.
    pub async fn merge<P: Serialize + Sync>(&self, id: impl ToString, partial: &P) -> Result<T, RepoError> {
        let id = id.to_string();
        let partial = serde_json::to_value(partial).map_err(|e| RepoError::serialization(e))?;
        match self.store.update(T::COLLECTION, &id, &partial).await {
            Ok(body) => decode(body),
            Err(e) if e.is_not_found() => Err(RepoError::not_found(T::ENTITY, id)),
            Err(e) => Err(e),
        }
    }

    /// Delete one record; a missing record is `RepoError::NotFound`.
    pub async fn delete(&self, id: impl ToString) -> Result<(), RepoError> {
        let id = id.to_string();
        if self.store.delete(T::COLLECTION, &id).await? {
            Ok(())
        } else {
            Err(RepoError::not_found(T::ENTITY, id))
        }
    }

    pub async fn delete_all(&self) -> Result<u64, RepoError> {
        self.store.delete_all(T::COLLECTION).await
    }

    /// Queue `record` for writing in `batch`.
    pub fn stage(batch: &mut WriteBatch, record: &T) -> Result<(), RepoError> {
        batch.put(T::COLLECTION, record.record_id(), record)?;
        Ok(())
    }

    pub fn stage_delete(batch: &mut WriteBatch, record: &T) {
        batch.delete(T::COLLECTION, record.record_id());
    }

    pub async fn commit(&self, batch: WriteBatch) -> Result<(), RepoError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.store.commit(batch).await
    }
}

impl<T: UserOwned> Records<T> {
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<T>, RepoError> {
        self.find(&RecordFilter::field("user_id", user_id)).await
    }
}
