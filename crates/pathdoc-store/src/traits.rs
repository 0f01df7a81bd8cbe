use async_trait::async_trait;
use pathdoc_types::{KeyPath, ObjectId};

use crate::error::StoreResult;
use crate::row::{Row, RowOp, RowUpsert};

/// Backing store for flattened documents.
///
/// Rows live in one table keyed by `(object_id, key_path)`. Any backend that
/// can answer a point read by object id, delete a single row, upsert a single
/// row, and run an ordered batch of those writes atomically is a valid store.
///
/// Implementations must satisfy these invariants:
/// - `(object_id, key_path)` is unique.
/// - An upsert on an existing row overwrites value, type and `updated_at`,
///   and preserves `created_at`.
/// - A batch applies completely or not at all.
/// - All backend errors are propagated, never silently ignored.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Read every row stored for `object_id`.
    ///
    /// Returns an empty vector if the object has no rows.
    async fn read_rows(&self, object_id: &ObjectId) -> StoreResult<Vec<Row>>;

    /// Delete one row. Returns `true` if the row existed.
    async fn delete_row(&self, object_id: &ObjectId, key_path: &KeyPath) -> StoreResult<bool>;

    /// Insert or overwrite one row.
    async fn upsert_row(&self, upsert: &RowUpsert) -> StoreResult<()>;

    /// Apply `ops` in order as one all-or-nothing unit.
    async fn execute_batch(&self, ops: &[RowOp]) -> StoreResult<()>;

    /// Check whether any row exists for `object_id`.
    ///
    /// Default implementation performs a full point read. Backends may
    /// override with a cheaper existence query.
    async fn exists(&self, object_id: &ObjectId) -> StoreResult<bool> {
        Ok(!self.read_rows(object_id).await?.is_empty())
    }

    /// Delete every row of `object_id` in one batch. Returns the number of
    /// rows removed.
    ///
    /// Default implementation reads the object's rows and submits one delete
    /// per row.
    async fn delete_object(&self, object_id: &ObjectId) -> StoreResult<usize> {
        let rows = self.read_rows(object_id).await?;
        if rows.is_empty() {
            return Ok(0);
        }
        let ops: Vec<RowOp> = rows
            .into_iter()
            .map(|row| RowOp::delete(row.object_id, row.key_path))
            .collect();
        self.execute_batch(&ops).await?;
        Ok(ops.len())
    }
}
