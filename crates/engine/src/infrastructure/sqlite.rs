//! SQLite-backed record store.
//!
//! One `records` table keyed by (collection, id) with JSON text bodies.
//! Filters use `json_extract`, batches run inside a single transaction.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::infrastructure::ports::{
    merge_fields, stored_revision, Collection, RecordFilter, RecordStore, RepoError, WriteBatch,
    WriteOp,
};

/// SQLite implementation of the record store.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the database file at `db_path`.
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| RepoError::database("open", e))?;
            }
        }
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("open", e))?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database. One connection, since every SQLite
    /// in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self, RepoError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| RepoError::database("open", e))?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, RepoError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("migrate", e))?;

        Ok(Self { pool })
    }

    async fn upsert(
        tx: &mut Transaction<'_, Sqlite>,
        collection: Collection,
        id: &str,
        body: &Value,
    ) -> Result<(), RepoError> {
        let json = serde_json::to_string(body).map_err(|e| RepoError::serialization(e))?;
        sqlx::query(
            r#"
            INSERT INTO records (collection, id, body)
            VALUES (?, ?, ?)
            ON CONFLICT(collection, id) DO UPDATE SET body = excluded.body
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(json)
        .execute(&mut **tx)
        .await
        .map_err(|e| RepoError::database("put", e))?;
        Ok(())
    }

    async fn fetch_in(
        tx: &mut Transaction<'_, Sqlite>,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Value>, RepoError> {
        let row = sqlx::query("SELECT body FROM records WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| RepoError::database("get", e))?;
        row.map(|row| parse_body(row.get("body"))).transpose()
    }
}

fn parse_body(json: String) -> Result<Value, RepoError> {
    serde_json::from_str(&json).map_err(|e| RepoError::serialization(e))
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, RepoError> {
        let row = sqlx::query("SELECT body FROM records WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get", e))?;
        row.map(|row| parse_body(row.get("body"))).transpose()
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &RecordFilter,
    ) -> Result<Vec<Value>, RepoError> {
        let mut sql = String::from("SELECT body FROM records WHERE collection = ?");
        for _ in filter.fields() {
            sql.push_str(" AND json_extract(body, ?) = ?");
        }
        sql.push_str(" ORDER BY rowid");
        if filter.max_records().is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql).bind(collection.as_str());
        for (name, value) in filter.fields() {
            query = query.bind(format!("$.{name}")).bind(value.as_str());
        }
        if let Some(limit) = filter.max_records() {
            query = query.bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("find", e))?;
        rows.into_iter()
            .map(|row| parse_body(row.get("body")))
            .collect()
    }

    async fn put(&self, collection: Collection, id: &str, body: &Value) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("put", e))?;
        Self::upsert(&mut tx, collection, id, body).await?;
        tx.commit()
            .await
            .map_err(|e| RepoError::database("put", e))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        partial: &Value,
    ) -> Result<Value, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("update", e))?;
        let mut body = Self::fetch_in(&mut tx, collection, id)
            .await?
            .ok_or_else(|| RepoError::not_found(collection.as_str(), id))?;
        merge_fields(&mut body, partial)?;
        Self::upsert(&mut tx, collection, id, &body).await?;
        tx.commit()
            .await
            .map_err(|e| RepoError::database("update", e))?;
        Ok(body)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM records WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, collection: Collection) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM records WHERE collection = ?")
            .bind(collection.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_all", e))?;
        Ok(result.rows_affected())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("commit", e))?;

        if let Some(guard) = &batch.guard {
            let current = Self::fetch_in(&mut tx, Collection::Users, &guard.user_id)
                .await?
                .map(|body| stored_revision(&body))
                .ok_or_else(|| RepoError::not_found("User", &guard.user_id))?;
            if current != guard.expected {
                // Dropping the transaction rolls it back
                return Err(RepoError::conflict(format!(
                    "user {} is at revision {current}, expected {}",
                    guard.user_id, guard.expected
                )));
            }
        }

        for op in &batch.ops {
            match op {
                WriteOp::Put {
                    collection,
                    id,
                    body,
                } => Self::upsert(&mut tx, *collection, id, body).await?,
                WriteOp::Delete { collection, id } => {
                    sqlx::query("DELETE FROM records WHERE collection = ? AND id = ?")
                        .bind(collection.as_str())
                        .bind(id.as_str())
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| RepoError::database("commit", e))?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("commit", e))?;
        tracing::debug!(ops = batch.len(), "Committed record batch");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
