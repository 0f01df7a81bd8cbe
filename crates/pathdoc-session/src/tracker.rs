//! Pending-change bookkeeping for one loaded object.

use std::collections::BTreeSet;

use pathdoc_types::KeyPath;

/// Paths awaiting upsert (`dirty`) or removal (`deleted`) since the last
/// load or save.
///
/// A path is never in both sets: marking one side removes it from the other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    dirty: BTreeSet<KeyPath>,
    deleted: BTreeSet<KeyPath>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, path: KeyPath) {
        self.deleted.remove(&path);
        self.dirty.insert(path);
    }

    pub fn mark_deleted(&mut self, path: KeyPath) {
        self.dirty.remove(&path);
        self.deleted.insert(path);
    }

    /// Forget a pending delete without marking the path dirty.
    pub fn unmark_deleted(&mut self, path: &KeyPath) {
        self.deleted.remove(path);
    }

    pub fn dirty(&self) -> &BTreeSet<KeyPath> {
        &self.dirty
    }

    pub fn deleted(&self) -> &BTreeSet<KeyPath> {
        &self.deleted
    }

    /// Total number of pending paths.
    pub fn pending(&self) -> usize {
        self.dirty.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty() && self.deleted.is_empty()
    }

    pub fn clear(&mut self) {
        self.dirty.clear();
        self.deleted.clear();
    }
}
