//! Write-back sessions for pathdoc.
//!
//! A [`Session`] loads one object's rows into memory, lets callers read and
//! mutate it as a flat mapping or as a nested document, and on save writes
//! back only the paths that changed, as one atomic batch.
//!
//! # Lifecycle
//!
//! ```text
//! NoObject --load--> Loaded(clean) --set/delete/set_all--> Loaded(dirty)
//! Loaded(dirty) --save ok--> Loaded(clean)
//! Loaded(dirty) --save err--> Loaded(dirty), unchanged
//! any --load(other)--> Loaded(clean), pending changes discarded
//! Loaded --delete_object(active)--> NoObject
//! ```
//!
//! # Modules
//!
//! - [`session`] -- [`Session`], the caller-facing surface
//! - [`coordinator`] -- [`PersistenceCoordinator`], change set planning and commit
//! - [`tracker`] -- [`ChangeTracker`], dirty and deleted path sets
//! - [`cache`] -- [`ObjectCache`], live state plus last-saved snapshot
//! - [`config`] -- [`SessionConfig`]

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod session;
pub mod tracker;

pub use cache::ObjectCache;
pub use config::{DecodePolicy, DiscardPolicy, SessionConfig};
pub use coordinator::{ChangeSet, PersistenceCoordinator, SaveSummary};
pub use error::{SessionError, SessionResult};
pub use session::{DiscardedChanges, LoadOutcome, Session};
pub use tracker::ChangeTracker;

pub use pathdoc_flatten::{flatten, unflatten, FlatMap};
pub use pathdoc_store::{InMemoryRowStore, RowStore};
pub use pathdoc_types::{KeyPath, Leaf, ObjectId, TypeTag};
