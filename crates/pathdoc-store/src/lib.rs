//! Row storage for pathdoc.
//!
//! Every leaf of every document is one row in a flat table keyed by
//! `(object_id, key_path)`:
//!
//! | column       | type            |
//! |--------------|-----------------|
//! | `object_id`  | text            |
//! | `key_path`   | text            |
//! | `value`      | text, nullable  |
//! | `value_type` | text            |
//! | `created_at` | integer (ms)    |
//! | `updated_at` | integer (ms)    |
//!
//! # Storage Backends
//!
//! All backends implement the [`RowStore`] trait:
//!
//! - [`InMemoryRowStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. The store never interprets leaf text; decoding belongs to the caller.
//! 2. Batches are all-or-nothing.
//! 3. Upserts preserve `created_at` and refresh `updated_at`.
//! 4. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod row;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryRowStore;
pub use row::{now_millis, Row, RowDelete, RowOp, RowUpsert};
pub use traits::RowStore;
