//! The write-back session: one loaded object, mutated in memory and saved
//! as a minimal batch of row writes.

use std::fmt;
use std::sync::Arc;

use pathdoc_flatten::{flatten, unflatten, FlatMap};
use pathdoc_store::RowStore;
use pathdoc_types::{codec, KeyPath, Leaf, ObjectId};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::ObjectCache;
use crate::config::{DecodePolicy, DiscardPolicy, SessionConfig};
use crate::coordinator::{ChangeSet, PersistenceCoordinator, SaveSummary};
use crate::error::{SessionError, SessionResult};
use crate::tracker::ChangeTracker;

/// Unsaved work dropped by a `load`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscardedChanges {
    pub object_id: ObjectId,
    pub dirty: Vec<KeyPath>,
    pub deleted: Vec<KeyPath>,
}

/// Result of a successful `load`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Rows read for the new object.
    pub rows: usize,
    /// Pending changes of the previous object, if any were dropped.
    pub discarded: Option<DiscardedChanges>,
}

struct ActiveObject {
    id: ObjectId,
    cache: ObjectCache,
    tracker: ChangeTracker,
}

impl ActiveObject {
    fn into_discarded(self) -> Option<DiscardedChanges> {
        if self.tracker.is_empty() {
            return None;
        }
        Some(DiscardedChanges {
            object_id: self.id,
            dirty: self.tracker.dirty().iter().cloned().collect(),
            deleted: self.tracker.deleted().iter().cloned().collect(),
        })
    }
}

/// A single-owner, in-memory view of one stored object.
///
/// A session starts with no object. [`Session::load`] reads an object's rows
/// and every other accessor then works against memory only, until
/// [`Session::save`] writes back exactly the paths that changed.
///
/// Sessions are not shared: one caller owns a session for the duration of one
/// logical operation. Two sessions may load the same object; their saves are
/// blind per-path writes, so disjoint edits merge and edits to the same path
/// resolve last-writer-wins.
pub struct Session {
    store: Arc<dyn RowStore>,
    config: SessionConfig,
    active: Option<ActiveObject>,
}

impl Session {
    /// Create an empty session over `store` with default config.
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    pub fn with_config(store: Arc<dyn RowStore>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            active: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Id of the loaded object, if any.
    pub fn current_object_id(&self) -> Option<&ObjectId> {
        self.active.as_ref().map(|active| &active.id)
    }

    // ---- Loading ----

    /// Load `object_id`, replacing whatever the session held.
    ///
    /// Unsaved changes of the previous object are dropped and reported in
    /// [`LoadOutcome::discarded`], unless the config rejects discards. On
    /// any error the session is left as it was.
    pub async fn load(&mut self, object_id: &str) -> SessionResult<LoadOutcome> {
        let id = ObjectId::new(object_id)?;

        if let Some(active) = &self.active {
            let pending = active.tracker.pending();
            if pending > 0 && self.config.on_pending_discard == DiscardPolicy::Reject {
                return Err(SessionError::UnsavedChanges {
                    object_id: active.id.clone(),
                    pending,
                });
            }
        }

        let rows = self
            .store
            .read_rows(&id)
            .await
            .map_err(|e| SessionError::store("load", &id, e))?;
        let row_count = rows.len();

        let mut flat = FlatMap::with_capacity(row_count);
        for row in rows {
            let leaf = match row.decode() {
                Ok(leaf) => leaf,
                Err(source) => match self.config.decode_policy {
                    DecodePolicy::Strict => {
                        return Err(SessionError::Decode {
                            object_id: id,
                            key_path: row.key_path,
                            source,
                        });
                    }
                    DecodePolicy::Lenient => {
                        warn!(
                            object_id = %id,
                            key_path = %row.key_path,
                            error = %source,
                            "substituting fallback for corrupt value"
                        );
                        codec::fallback_for(row.value_type)
                    }
                },
            };
            flat.insert(row.key_path, leaf);
        }

        let discarded = self.active.take().and_then(ActiveObject::into_discarded);
        if let Some(lost) = &discarded {
            warn!(
                object_id = %lost.object_id,
                dirty = lost.dirty.len(),
                deleted = lost.deleted.len(),
                "discarding unsaved changes"
            );
        }

        debug!(object_id = %id, rows = row_count, "object loaded");
        self.active = Some(ActiveObject {
            id,
            cache: ObjectCache::loaded(flat),
            tracker: ChangeTracker::new(),
        });
        Ok(LoadOutcome {
            rows: row_count,
            discarded,
        })
    }

    // ---- Reads ----

    /// Value at `path`, or `None` if the path holds nothing.
    pub fn get(&self, path: &str) -> SessionResult<Option<&Leaf>> {
        let path = KeyPath::new(path)?;
        Ok(self.active()?.cache.flat.get(&path))
    }

    /// The whole object as a nested document.
    pub fn get_all(&self) -> SessionResult<Value> {
        Ok(unflatten(&self.active()?.cache.flat))
    }

    /// The live flat mapping.
    pub fn flat(&self) -> SessionResult<&FlatMap> {
        Ok(&self.active()?.cache.flat)
    }

    /// The tracked dirty and deleted paths.
    pub fn tracker(&self) -> SessionResult<&ChangeTracker> {
        Ok(&self.active()?.tracker)
    }

    pub fn has_unsaved_changes(&self) -> SessionResult<bool> {
        Ok(!self.active()?.tracker.is_empty())
    }

    /// The change set the next [`Session::save`] would submit. No I/O.
    pub fn pending_changes(&self) -> SessionResult<ChangeSet> {
        let active = self.active()?;
        Ok(PersistenceCoordinator::plan(&active.cache, &active.tracker))
    }

    // ---- Mutations ----

    /// Write `value` at `path`.
    ///
    /// The path becomes dirty unless the previous in-memory value is a
    /// primitive equal to `value` (see [`Leaf::shallow_eq`]).
    pub fn set(&mut self, path: &str, value: impl Into<Leaf>) -> SessionResult<()> {
        let path = KeyPath::new(path)?;
        let active = self.active_mut()?;
        let value = value.into();

        active.tracker.unmark_deleted(&path);
        let changed = match active.cache.flat.get(&path) {
            Some(previous) => !previous.shallow_eq(&value),
            None => true,
        };
        active.cache.flat.insert(path.clone(), value);
        if changed {
            active.tracker.mark_dirty(path);
        }
        Ok(())
    }

    /// Remove `path`. Returns `false` if it held nothing.
    ///
    /// A pending write to the same path is dropped in favour of the delete.
    pub fn delete(&mut self, path: &str) -> SessionResult<bool> {
        let path = KeyPath::new(path)?;
        let active = self.active_mut()?;
        if active.cache.flat.shift_remove(&path).is_none() {
            return Ok(false);
        }
        active.tracker.mark_deleted(path);
        Ok(true)
    }

    /// Replace the whole object with `document`.
    ///
    /// Every new path becomes dirty; every old path not present in
    /// `document` becomes deleted.
    pub fn set_all(&mut self, document: &Value) -> SessionResult<()> {
        let active = self.active_mut()?;
        let flat = flatten(document)?;

        let previous = std::mem::replace(&mut active.cache.flat, flat);
        for path in previous.into_keys() {
            active.tracker.mark_deleted(path);
        }
        for path in active.cache.flat.keys() {
            active.tracker.mark_dirty(path.clone());
        }
        Ok(())
    }

    /// Drop all unsaved changes and return to the last loaded or saved state.
    pub fn discard_changes(&mut self) -> SessionResult<()> {
        let active = self.active_mut()?;
        active.cache.revert();
        active.tracker.clear();
        Ok(())
    }

    // ---- Persistence ----

    /// Write tracked changes back as one atomic batch.
    ///
    /// On failure the session is unchanged and the save can be retried.
    pub async fn save(&mut self) -> SessionResult<SaveSummary> {
        let Some(active) = self.active.as_mut() else {
            return Err(SessionError::NoActiveObject);
        };
        let changes = PersistenceCoordinator::plan(&active.cache, &active.tracker);
        let summary =
            PersistenceCoordinator::commit(self.store.as_ref(), &active.id, &changes).await?;

        active.cache.commit();
        active.tracker.clear();
        Ok(summary)
    }

    /// Whether `object_id` has any stored rows. Independent of the loaded object.
    pub async fn exists(&self, object_id: &str) -> SessionResult<bool> {
        let id = ObjectId::new(object_id)?;
        self.store
            .exists(&id)
            .await
            .map_err(|e| SessionError::store("exists", &id, e))
    }

    /// Delete every stored row of an object. Returns the number of rows removed.
    ///
    /// `None` targets the loaded object. Deleting the loaded object leaves the
    /// session with no object.
    pub async fn delete_object(&mut self, object_id: Option<&str>) -> SessionResult<usize> {
        let id = match object_id {
            Some(raw) => ObjectId::new(raw)?,
            None => self.active()?.id.clone(),
        };
        let removed = self
            .store
            .delete_object(&id)
            .await
            .map_err(|e| SessionError::store("delete_object", &id, e))?;

        if self.current_object_id() == Some(&id) {
            self.active = None;
        }
        info!(object_id = %id, rows = removed, "object deleted");
        Ok(removed)
    }

    fn active(&self) -> SessionResult<&ActiveObject> {
        self.active.as_ref().ok_or(SessionError::NoActiveObject)
    }

    fn active_mut(&mut self) -> SessionResult<&mut ActiveObject> {
        self.active.as_mut().ok_or(SessionError::NoActiveObject)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("object_id", &self.current_object_id())
            .field(
                "pending",
                &self.active.as_ref().map_or(0, |a| a.tracker.pending()),
            )
            .finish()
    }
}
