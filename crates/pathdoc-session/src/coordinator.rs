//! Turns tracked session changes into one atomic batch of row writes.

use pathdoc_store::{now_millis, RowOp, RowStore};
use pathdoc_types::{KeyPath, Leaf, ObjectId};
use tracing::debug;

use crate::cache::ObjectCache;
use crate::error::{SessionError, SessionResult};
use crate::tracker::ChangeTracker;

/// The writes a save would submit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    /// Paths to remove from the store. Only paths present in the snapshot.
    pub deletes: Vec<KeyPath>,
    /// Paths to upsert with their current value.
    pub upserts: Vec<(KeyPath, Leaf)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.upserts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deletes.len() + self.upserts.len()
    }

    /// Row ops for this change set, deletes first.
    pub fn to_ops(&self, object_id: &ObjectId, timestamp: i64) -> Vec<RowOp> {
        let deletes = self
            .deletes
            .iter()
            .map(|path| RowOp::delete(object_id.clone(), path.clone()));
        let upserts = self
            .upserts
            .iter()
            .map(|(path, leaf)| RowOp::upsert(object_id.clone(), path.clone(), leaf, timestamp));
        deletes.chain(upserts).collect()
    }
}

/// Counts of row writes made by a save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub deleted: usize,
    pub upserted: usize,
}

/// Computes and commits the minimal write set for a session.
pub struct PersistenceCoordinator;

impl PersistenceCoordinator {
    /// Compute the change set for `cache` given the tracked paths.
    ///
    /// Deleted paths that never reached the store are skipped.
    pub fn plan(cache: &ObjectCache, tracker: &ChangeTracker) -> ChangeSet {
        let deletes = tracker
            .deleted()
            .iter()
            .filter(|path| cache.snapshot.contains_key(*path))
            .cloned()
            .collect();
        let upserts = tracker
            .dirty()
            .iter()
            .filter_map(|path| cache.flat.get(path).map(|leaf| (path.clone(), leaf.clone())))
            .collect();
        ChangeSet { deletes, upserts }
    }

    /// Submit `changes` as one batch. An empty change set makes no store call.
    pub async fn commit(
        store: &dyn RowStore,
        object_id: &ObjectId,
        changes: &ChangeSet,
    ) -> SessionResult<SaveSummary> {
        if changes.is_empty() {
            debug!(object_id = %object_id, "nothing to save");
            return Ok(SaveSummary::default());
        }

        let ops = changes.to_ops(object_id, now_millis());
        store
            .execute_batch(&ops)
            .await
            .map_err(|e| SessionError::store("save", object_id, e))?;

        debug!(
            object_id = %object_id,
            deleted = changes.deletes.len(),
            upserted = changes.upserts.len(),
            "batch committed"
        );
        Ok(SaveSummary {
            deleted: changes.deletes.len(),
            upserted: changes.upserts.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathdoc_flatten::FlatMap;
    use pathdoc_store::{InMemoryRowStore, StoreError};

    fn path(s: &str) -> KeyPath {
        KeyPath::new(s).unwrap()
    }

    fn id() -> ObjectId {
        ObjectId::new("doc").unwrap()
    }

    fn map(entries: &[(&str, i64)]) -> FlatMap {
        entries
            .iter()
            .map(|(p, n)| (path(p), Leaf::from(*n)))
            .collect()
    }

    #[test]
    fn plan_skips_deletes_never_persisted() {
        let cache = ObjectCache {
            flat: map(&[]),
            snapshot: map(&[("stored", 1)]),
        };
        let mut tracker = ChangeTracker::new();
        tracker.mark_deleted(path("stored"));
        tracker.mark_deleted(path("local_only"));

        let plan = PersistenceCoordinator::plan(&cache, &tracker);
        assert_eq!(plan.deletes, vec![path("stored")]);
        assert!(plan.upserts.is_empty());
    }

    #[test]
    fn plan_upserts_current_values() {
        let cache = ObjectCache {
            flat: map(&[("a", 2), ("b", 3)]),
            snapshot: map(&[("a", 1)]),
        };
        let mut tracker = ChangeTracker::new();
        tracker.mark_dirty(path("a"));

        let plan = PersistenceCoordinator::plan(&cache, &tracker);
        assert_eq!(plan.upserts, vec![(path("a"), Leaf::from(2))]);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn ops_put_deletes_first() {
        let plan = ChangeSet {
            deletes: vec![path("old")],
            upserts: vec![(path("new"), Leaf::from(1))],
        };
        let ops = plan.to_ops(&id(), 42);
        assert_eq!(ops.len(), 2);
        assert!(ops[0].is_delete());
        match &ops[1] {
            RowOp::Upsert(u) => {
                assert_eq!(u.key_path, path("new"));
                assert_eq!(u.timestamp, 42);
            }
            other => panic!("expected upsert, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_change_set_makes_no_store_call() {
        let store = InMemoryRowStore::new();
        // An armed failure would surface if a batch were submitted.
        store.fail_next_batches(1);
        let summary = PersistenceCoordinator::commit(&store, &id(), &ChangeSet::default())
            .await
            .unwrap();
        assert_eq!(summary, SaveSummary::default());
    }

    #[tokio::test]
    async fn failure_is_wrapped_with_operation_and_object() {
        let store = InMemoryRowStore::new();
        store.fail_next_batches(1);
        let plan = ChangeSet {
            deletes: vec![],
            upserts: vec![(path("a"), Leaf::from(1))],
        };
        let err = PersistenceCoordinator::commit(&store, &id(), &plan)
            .await
            .unwrap_err();
        match err {
            SessionError::Store {
                operation,
                object_id,
                source,
            } => {
                assert_eq!(operation, "save");
                assert_eq!(object_id, id());
                assert!(matches!(source, StoreError::Unavailable(_)));
            }
            other => panic!("expected store error, got {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn commit_reports_counts() {
        let store = InMemoryRowStore::new();
        let plan = ChangeSet {
            deletes: vec![path("gone")],
            upserts: vec![(path("a"), Leaf::from(1)), (path("b"), Leaf::from(2))],
        };
        let summary = PersistenceCoordinator::commit(&store, &id(), &plan)
            .await
            .unwrap();
        assert_eq!(summary, SaveSummary { deleted: 1, upserted: 2 });
        assert_eq!(store.len(), 2);
    }
}
