use thiserror::Error;

use crate::leaf::TypeTag;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id {id:?}: {reason}")]
    InvalidObjectId { id: String, reason: String },

    #[error("invalid key path {path:?}: {reason}")]
    InvalidKeyPath { path: String, reason: String },

    #[error("unknown value type: {0:?}")]
    UnknownTypeTag(String),
}

/// Errors produced when stored text cannot be decoded under its type tag.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a number: {text:?}")]
    InvalidNumber { text: String },

    #[error("not a boolean: {text:?}")]
    InvalidBoolean { text: String },

    /// Structured text did not parse, or parsed to the wrong container kind.
    #[error("malformed {expected} text {text:?}: {reason}")]
    MalformedStructure {
        expected: TypeTag,
        text: String,
        reason: String,
    },
}
