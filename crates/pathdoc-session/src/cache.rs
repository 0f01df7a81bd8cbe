use pathdoc_flatten::FlatMap;

/// In-memory projection of one object.
///
/// `flat` is the live state callers read and mutate. `snapshot` is the state
/// as of the last successful load or save, and decides which deletes need to
/// reach the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectCache {
    pub flat: FlatMap,
    pub snapshot: FlatMap,
}

impl ObjectCache {
    /// A cache whose live state and snapshot both equal `flat`.
    pub fn loaded(flat: FlatMap) -> Self {
        Self {
            snapshot: flat.clone(),
            flat,
        }
    }

    /// Promote the live state to the new snapshot.
    pub fn commit(&mut self) {
        self.snapshot = self.flat.clone();
    }

    /// Drop live edits and return to the snapshot.
    pub fn revert(&mut self) {
        self.flat = self.snapshot.clone();
    }
}
