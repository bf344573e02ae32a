//! In-memory record store for development and testing.
//!
//! Does not persist data. A single lock guards every collection, so a batch
//! commit is trivially atomic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    merge_fields, stored_revision, Collection, RecordFilter, RecordStore, RepoError, WriteBatch,
    WriteOp,
};

#[derive(Default)]
struct Records {
    bodies: HashMap<(Collection, String), Stored>,
    next_seq: u64,
}

struct Stored {
    seq: u64,
    body: Value,
}

impl Records {
    fn put(&mut self, collection: Collection, id: String, body: Value) {
        match self.bodies.get_mut(&(collection, id.clone())) {
            Some(existing) => existing.body = body,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.bodies.insert((collection, id), Stored { seq, body });
            }
        }
    }

    fn delete(&mut self, collection: Collection, id: &str) -> bool {
        self.bodies.remove(&(collection, id.to_string())).is_some()
    }
}

/// In-memory record store
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, RepoError> {
        let records = self.records.read().await;
        Ok(records
            .bodies
            .get(&(collection, id.to_string()))
            .map(|stored| stored.body.clone()))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &RecordFilter,
    ) -> Result<Vec<Value>, RepoError> {
        let records = self.records.read().await;
        let mut matched: Vec<&Stored> = records
            .bodies
            .iter()
            .filter(|((c, _), stored)| *c == collection && filter.matches(&stored.body))
            .map(|(_, stored)| stored)
            .collect();
        matched.sort_by_key(|stored| stored.seq);
        matched.truncate(filter.max_records().unwrap_or(usize::MAX));
        Ok(matched.into_iter().map(|stored| stored.body.clone()).collect())
    }

    async fn put(&self, collection: Collection, id: &str, body: &Value) -> Result<(), RepoError> {
        let mut records = self.records.write().await;
        records.put(collection, id.to_string(), body.clone());
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        partial: &Value,
    ) -> Result<Value, RepoError> {
        let mut records = self.records.write().await;
        let stored = records
            .bodies
            .get_mut(&(collection, id.to_string()))
            .ok_or_else(|| RepoError::not_found(collection.as_str(), id))?;
        let mut merged = stored.body.clone();
        merge_fields(&mut merged, partial)?;
        stored.body = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, RepoError> {
        let mut records = self.records.write().await;
        Ok(records.delete(collection, id))
    }

    async fn delete_all(&self, collection: Collection) -> Result<u64, RepoError> {
        let mut records = self.records.write().await;
        let before = records.bodies.len();
        records.bodies.retain(|(c, _), _| *c != collection);
        Ok((before - records.bodies.len()) as u64)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), RepoError> {
        let mut records = self.records.write().await;

        if let Some(guard) = &batch.guard {
            let current = records
                .bodies
                .get(&(Collection::Users, guard.user_id.clone()))
                .map(|stored| stored_revision(&stored.body))
                .ok_or_else(|| RepoError::not_found("User", &guard.user_id))?;
            if current != guard.expected {
                return Err(RepoError::conflict(format!(
                    "user {} is at revision {current}, expected {}",
                    guard.user_id, guard.expected
                )));
            }
        }

        for op in batch.ops {
            match op {
                WriteOp::Put {
                    collection,
                    id,
                    body,
                } => records.put(collection, id, body),
                WriteOp::Delete { collection, id } => {
                    records.delete(collection, &id);
                }
            }
        }
        Ok(())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn find_returns_matches_in_insertion_order() {
        let store = InMemoryRecordStore::new();
        for (id, owner) in [("c", "u1"), ("a", "u2"), ("b", "u1")] {
            store
                .put(Collection::Quests, id, &json!({"id": id, "user_id": owner}))
                .await
                .unwrap();
        }
        // Replacing keeps the original position
        store
            .put(Collection::Quests, "c", &json!({"id": "c", "user_id": "u1", "v": 2}))
            .await
            .unwrap();

        let found = store
            .find(Collection::Quests, &RecordFilter::field("user_id", "u1"))
            .await
            .unwrap();

        let ids: Vec<&str> = found.iter().filter_map(|b| b["id"].as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert_eq!(found[0]["v"], 2);
    }

    #[tokio::test]
    async fn update_merges_and_reports_missing() {
        let store = InMemoryRecordStore::new();
        store
            .put(Collection::ShopItems, "s1", &json!({"name": "Old", "price": 3}))
            .await
            .unwrap();

        let merged = store
            .update(Collection::ShopItems, "s1", &json!({"name": "New"}))
            .await
            .unwrap();
        assert_eq!(merged, json!({"name": "New", "price": 3}));

        let err = store
            .update(Collection::ShopItems, "nope", &json!({}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn guarded_commit_rejects_stale_revision_and_writes_nothing() {
        let store = InMemoryRecordStore::new();
        store
            .put(Collection::Users, "u1", &json!({"id": "u1", "revision": 2}))
            .await
            .unwrap();

        let mut batch = WriteBatch::new();
        batch.guard_revision("u1", 1);
        batch
            .put(Collection::Users, "u1", &json!({"id": "u1", "revision": 2}))
            .unwrap();
        batch
            .put(Collection::Inventory, "i1", &json!({"id": "i1"}))
            .unwrap();

        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert!(store
            .get(Collection::Inventory, "i1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn commit_applies_puts_and_deletes() {
        let store = InMemoryRecordStore::new();
        store
            .put(Collection::Inventory, "old", &json!({"id": "old"}))
            .await
            .unwrap();

        let mut batch = WriteBatch::new();
        batch.delete(Collection::Inventory, "old");
        batch
            .put(Collection::Inventory, "new", &json!({"id": "new"}))
            .unwrap();
        store.commit(batch).await.unwrap();

        assert!(store.get(Collection::Inventory, "old").await.unwrap().is_none());
        assert!(store.get(Collection::Inventory, "new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_all_only_touches_one_collection() {
        let store = InMemoryRecordStore::new();
        store.put(Collection::ShopItems, "a", &json!({})).await.unwrap();
        store.put(Collection::ShopItems, "b", &json!({})).await.unwrap();
        store.put(Collection::Powers, "p", &json!({})).await.unwrap();

        assert_eq!(store.delete_all(Collection::ShopItems).await.unwrap(), 2);
        assert!(store.get(Collection::Powers, "p").await.unwrap().is_some());
    }
}
