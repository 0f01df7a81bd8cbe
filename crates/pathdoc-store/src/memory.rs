use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use pathdoc_types::{KeyPath, ObjectId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::row::{Row, RowOp, RowUpsert};
use crate::traits::RowStore;

type RowKey = (ObjectId, KeyPath);

/// In-memory, BTreeMap-based row store.
///
/// Intended for tests and embedding. Rows are held behind a `RwLock` and
/// returned in `(object_id, key_path)` order. Batches are applied to a staged
/// copy that replaces the live table only when every op succeeded.
pub struct InMemoryRowStore {
    rows: RwLock<BTreeMap<RowKey, Row>>,
    failing_batches: AtomicUsize,
    failing_reads: AtomicUsize,
}

impl InMemoryRowStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            failing_batches: AtomicUsize::new(0),
            failing_reads: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` calls to [`RowStore::execute_batch`] fail with
    /// [`StoreError::Unavailable`] without applying anything.
    pub fn fail_next_batches(&self, count: usize) {
        self.failing_batches.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` calls to [`RowStore::read_rows`] fail with
    /// [`StoreError::Unavailable`].
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// Number of rows across all objects.
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a single row.
    pub fn row(&self, object_id: &ObjectId, key_path: &KeyPath) -> StoreResult<Option<Row>> {
        let rows = self.read_lock()?;
        Ok(rows.get(&(object_id.clone(), key_path.clone())).cloned())
    }

    /// Remove all rows from the store.
    pub fn clear(&self) -> StoreResult<()> {
        self.write_lock()?.clear();
        Ok(())
    }

    fn read_lock(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<RowKey, Row>>> {
        self.rows
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write_lock(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, BTreeMap<RowKey, Row>>> {
        self.rows
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn take_injected_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn apply_upsert(rows: &mut BTreeMap<RowKey, Row>, upsert: &RowUpsert) {
    let key = (upsert.object_id.clone(), upsert.key_path.clone());
    match rows.get_mut(&key) {
        Some(existing) => upsert.apply_to(existing),
        None => {
            rows.insert(key, upsert.to_new_row());
        }
    }
}

fn apply_op(rows: &mut BTreeMap<RowKey, Row>, op: &RowOp) {
    match op {
        RowOp::Delete(d) => {
            rows.remove(&(d.object_id.clone(), d.key_path.clone()));
        }
        RowOp::Upsert(u) => apply_upsert(rows, u),
    }
}

impl Default for InMemoryRowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn read_rows(&self, object_id: &ObjectId) -> StoreResult<Vec<Row>> {
        if Self::take_injected_failure(&self.failing_reads) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        let rows = self.read_lock()?;
        Ok(rows
            .iter()
            .filter(|((id, _), _)| id == object_id)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn delete_row(&self, object_id: &ObjectId, key_path: &KeyPath) -> StoreResult<bool> {
        let mut rows = self.write_lock()?;
        Ok(rows.remove(&(object_id.clone(), key_path.clone())).is_some())
    }

    async fn upsert_row(&self, upsert: &RowUpsert) -> StoreResult<()> {
        let mut rows = self.write_lock()?;
        apply_upsert(&mut rows, upsert);
        Ok(())
    }

    async fn execute_batch(&self, ops: &[RowOp]) -> StoreResult<()> {
        if Self::take_injected_failure(&self.failing_batches) {
            return Err(StoreError::Unavailable("injected batch failure".into()));
        }
        let mut rows = self.write_lock()?;
        let mut staged = rows.clone();
        for op in ops {
            apply_op(&mut staged, op);
        }
        *rows = staged;
        debug!(ops = ops.len(), "batch applied");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryRowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRowStore")
            .field("row_count", &self.len())
            .finish()
    }
}
