//! Standalone comparison of two flat mappings.
//!
//! These helpers compare any two [`FlatMap`]s using the structural
//! [`has_value_changed`] test. Session write-back does not use them; it
//! tracks changes as they are made.

use pathdoc_types::{has_value_changed, KeyPath};

use crate::flatten::FlatMap;

/// Entries of `new` that are absent from `old` or whose value changed.
///
/// Result order follows `new`.
pub fn diff(old: &FlatMap, new: &FlatMap) -> FlatMap {
    new.iter()
        .filter(|(path, leaf)| match old.get(*path) {
            Some(previous) => has_value_changed(previous, leaf),
            None => true,
        })
        .map(|(path, leaf)| (path.clone(), leaf.clone()))
        .collect()
}

/// Paths present in `old` but absent from `new`, in `old` order.
pub fn deleted_keys(old: &FlatMap, new: &FlatMap) -> Vec<KeyPath> {
    old.keys()
        .filter(|path| !new.contains_key(*path))
        .cloned()
        .collect()
}
