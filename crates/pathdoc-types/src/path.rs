//! Object id and key path validation.
//!
//! Valid object ids:
//! - Must be non-empty
//! - Must not have leading or trailing whitespace
//! - Must be at most [`MAX_OBJECT_ID_LEN`] Unicode scalar values
//!
//! Valid key paths:
//! - Must be non-empty
//! - Must not have leading or trailing whitespace
//! - Must not start or end with `.`
//! - Must not contain `..` (empty segment)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum object id length, counted in `char`s (Unicode scalar values), not
/// bytes or UTF-16 code units.
pub const MAX_OBJECT_ID_LEN: usize = 255;

/// Segment separator inside a [`KeyPath`].
pub const PATH_SEPARATOR: char = '.';

/// Identifier of one logical document.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Validate and wrap an object id.
    ///
    /// ```
    /// use pathdoc_types::ObjectId;
    ///
    /// assert!(ObjectId::new("user:42").is_ok());
    /// assert!(ObjectId::new("").is_err());
    /// assert!(ObjectId::new(" padded").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_object_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_object_id(id: &str) -> Result<(), TypeError> {
    let reject = |reason: &str| TypeError::InvalidObjectId {
        id: id.to_string(),
        reason: reason.into(),
    };

    if id.is_empty() {
        return Err(reject("object id must not be empty"));
    }
    if id.trim() != id {
        return Err(reject("must not have leading or trailing whitespace"));
    }
    let len = id.chars().count();
    if len > MAX_OBJECT_ID_LEN {
        return Err(TypeError::InvalidObjectId {
            id: id.to_string(),
            reason: format!("length {len} exceeds {MAX_OBJECT_ID_LEN}"),
        });
    }
    Ok(())
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ObjectId {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

/// Dot-joined address of a leaf inside a nested document.
///
/// Segment order defines nesting: `profile.name` is the `name` key of the
/// object stored under `profile`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyPath(String);

impl KeyPath {
    /// Validate and wrap a key path.
    ///
    /// ```
    /// use pathdoc_types::KeyPath;
    ///
    /// assert!(KeyPath::new("profile.name").is_ok());
    /// assert!(KeyPath::new(".profile").is_err());
    /// assert!(KeyPath::new("profile..name").is_err());
    /// ```
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        validate_key_path(&path)?;
        Ok(Self(path))
    }

    /// Append `key` as a new trailing segment.
    pub fn child(&self, key: &str) -> Result<Self, TypeError> {
        Self::new(format!("{}{PATH_SEPARATOR}{key}", self.0))
    }

    /// Segments in nesting order. Never empty.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split(PATH_SEPARATOR)
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_key_path(path: &str) -> Result<(), TypeError> {
    let reject = |reason: &str| TypeError::InvalidKeyPath {
        path: path.to_string(),
        reason: reason.into(),
    };

    if path.is_empty() {
        return Err(reject("key path must not be empty"));
    }
    if path.trim() != path {
        return Err(reject("must not have leading or trailing whitespace"));
    }
    if path.starts_with(PATH_SEPARATOR) || path.ends_with(PATH_SEPARATOR) {
        return Err(reject("must not start or end with '.'"));
    }
    if path.contains("..") {
        return Err(reject("must not contain '..'"));
    }
    Ok(())
}

impl fmt::Debug for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPath({})", self.0)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KeyPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for KeyPath {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyPath> for String {
    fn from(path: KeyPath) -> Self {
        path.0
    }
}
