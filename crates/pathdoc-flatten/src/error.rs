//! Error types for the flatten crate.

use pathdoc_types::{TypeError, TypeTag};

/// Errors that can occur while flattening a document.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlattenError {
    /// Only objects can be flattened into key paths.
    #[error("expected an object at the document root, found {found}")]
    NotAnObject { found: TypeTag },

    /// A key produced a path that cannot be addressed.
    #[error("unaddressable key: {0}")]
    InvalidKey(#[from] TypeError),
}

/// Convenience alias for flatten results.
pub type FlattenResult<T> = Result<T, FlattenError>;
