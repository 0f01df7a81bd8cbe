use pathdoc_flatten::FlattenError;
use pathdoc_store::StoreError;
use pathdoc_types::{DecodeError, KeyPath, ObjectId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed object id or key path.
    #[error("validation failed: {0}")]
    Validation(#[from] TypeError),

    #[error("cannot flatten document: {0}")]
    Flatten(#[from] FlattenError),

    #[error("no active object: call load first")]
    NoActiveObject,

    #[error("{operation} failed for object {object_id}: {source}")]
    Store {
        operation: &'static str,
        object_id: ObjectId,
        #[source]
        source: StoreError,
    },

    #[error("corrupt value at {object_id}/{key_path}: {source}")]
    Decode {
        object_id: ObjectId,
        key_path: KeyPath,
        #[source]
        source: DecodeError,
    },

    #[error("object {object_id} has {pending} unsaved change(s)")]
    UnsavedChanges { object_id: ObjectId, pending: usize },

    #[error("invalid session config: {0}")]
    Config(#[from] toml::de::Error),
}

impl SessionError {
    pub(crate) fn store(operation: &'static str, object_id: &ObjectId, source: StoreError) -> Self {
        Self::Store {
            operation,
            object_id: object_id.clone(),
            source,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
