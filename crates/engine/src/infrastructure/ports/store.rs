//! Record store port.
//!
//! Records are JSON documents keyed by (collection, id). Typed access lives in
//! `crate::entities`; adapters only ever see opaque ids and JSON bodies.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::RepoError;

/// Named record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Quests,
    ShopItems,
    Inventory,
    Powers,
    CustomStats,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Quests => "quests",
            Self::ShopItems => "shop_items",
            Self::Inventory => "inventory",
            Self::Powers => "powers",
            Self::CustomStats => "custom_stats",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter on top-level string fields, with an optional cap on the
/// number of records returned. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    fields: Vec<(&'static str, String)>,
    limit: Option<usize>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn field(name: &'static str, value: impl ToString) -> Self {
        Self::all().and(name, value)
    }

    pub fn and(mut self, name: &'static str, value: impl ToString) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }

    /// Return at most `limit` records, oldest first.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn max_records(&self) -> Option<usize> {
        self.limit
    }

    pub fn matches(&self, body: &Value) -> bool {
        self.fields
            .iter()
            .all(|(name, value)| body.get(*name).and_then(Value::as_str) == Some(value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Put {
        collection: Collection,
        id: String,
        body: Value,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

/// Precondition on a user record: its stored `revision` must still be
/// `expected` when the batch commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionGuard {
    pub user_id: String,
    pub expected: u64,
}

/// Writes that commit together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub ops: Vec<WriteOp>,
    pub guard: Option<RevisionGuard>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Serialize>(
        &mut self,
        collection: Collection,
        id: impl ToString,
        record: &T,
    ) -> Result<&mut Self, RepoError> {
        let body = serde_json::to_value(record).map_err(|e| RepoError::serialization(e))?;
        self.ops.push(WriteOp::Put {
            collection,
            id: id.to_string(),
            body,
        });
        Ok(self)
    }

    pub fn delete(&mut self, collection: Collection, id: impl ToString) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection,
            id: id.to_string(),
        });
        self
    }

    pub fn guard_revision(&mut self, user_id: impl ToString, expected: u64) -> &mut Self {
        self.guard = Some(RevisionGuard {
            user_id: user_id.to_string(),
            expected,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// Revision stored on a user body. Records written before revisions existed
/// count as revision 0.
pub fn stored_revision(body: &Value) -> u64 {
    body.get("revision").and_then(Value::as_u64).unwrap_or(0)
}

/// Shallow merge of `partial`'s top-level fields into `body`.
pub fn merge_fields(body: &mut Value, partial: &Value) -> Result<(), RepoError> {
    match (body.as_object_mut(), partial.as_object()) {
        (Some(target), Some(fields)) => {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
            Ok(())
        }
        _ => Err(RepoError::serialization(
            "partial update requires JSON objects",
        )),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, RepoError>;

    /// Matching records in insertion order.
    async fn find(
        &self,
        collection: Collection,
        filter: &RecordFilter,
    ) -> Result<Vec<Value>, RepoError>;

    /// Insert or replace.
    async fn put(&self, collection: Collection, id: &str, body: &Value) -> Result<(), RepoError>;

    /// Merge `partial` into an existing record and return the result.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        partial: &Value,
    ) -> Result<Value, RepoError>;

    /// Returns whether a record was removed.
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, RepoError>;

    /// Returns how many records were removed.
    async fn delete_all(&self, collection: Collection) -> Result<u64, RepoError>;

    /// Apply every op atomically, after checking the batch's revision guard.
    async fn commit(&self, batch: WriteBatch) -> Result<(), RepoError>;

    async fn close(&self);
}
