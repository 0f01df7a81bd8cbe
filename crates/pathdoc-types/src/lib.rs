//! Foundation types for pathdoc.
//!
//! pathdoc stores nested JSON-like documents as flat rows addressed by
//! `(object id, dotted key path)`. This crate defines the addressing and leaf
//! types every other pathdoc crate builds on.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Validated identifier of one logical document
//! - [`KeyPath`] -- Validated dot-joined address of a leaf
//! - [`TypeTag`] -- Closed set of leaf types
//! - [`Leaf`] -- Tagged leaf value carried end-to-end
//!
//! The [`codec`] module serializes leaves to their stored textual form and
//! decodes them back, strictly or leniently.

pub mod codec;
pub mod error;
pub mod leaf;
pub mod path;

pub use codec::{decode, decode_lenient, encode, has_value_changed};
pub use error::{DecodeError, TypeError};
pub use leaf::{Leaf, TypeTag};
pub use path::{KeyPath, ObjectId, MAX_OBJECT_ID_LEN, PATH_SEPARATOR};
