//! Flattening codec for pathdoc.
//!
//! Converts nested JSON-like documents into ordered `key path → leaf`
//! mappings and back. Arrays are always opaque leaves; only objects are
//! recursed into.
//!
//! # Key Items
//!
//! - [`flatten`] / [`FlatMap`] -- document to key-path leaves
//! - [`unflatten`] -- typed leaves back to a document
//! - [`unflatten_text`] / [`parse_value`] -- untagged leaf text back to a document
//! - [`diff`] / [`deleted_keys`] -- compare two flat mappings

pub mod diff;
pub mod error;
pub mod flatten;
pub mod unflatten;

pub use diff::{deleted_keys, diff};
pub use error::{FlattenError, FlattenResult};
pub use flatten::{flatten, flatten_object, FlatMap};
pub use unflatten::{parse_value, unflatten, unflatten_text};
