//! Typed leaf values.
//!
//! A [`Leaf`] is the value stored at one key path. It carries its own
//! [`TypeTag`], so the tag written to storage can never disagree with the
//! payload it describes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::TypeError;

/// Closed set of leaf types. Exactly one tag per stored leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Null,
    Undefined,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl TypeTag {
    /// The tag as written to the `value_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Returns `true` for tags compared by value rather than by structure.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Array | Self::Object)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(Self::Null),
            "undefined" => Ok(Self::Undefined),
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            other => Err(TypeError::UnknownTypeTag(other.to_string())),
        }
    }
}

/// A single stored value.
///
/// Arrays and objects are opaque here: an array leaf is never exploded into
/// per-element paths.
#[derive(Clone, Debug, PartialEq)]
pub enum Leaf {
    Null,
    /// An explicitly unset value. Persisted as `NULL`, so it reloads as [`Leaf::Null`].
    Undefined,
    Boolean(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl Leaf {
    /// Classify this leaf.
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Null => TypeTag::Null,
            Self::Undefined => TypeTag::Undefined,
            Self::Boolean(_) => TypeTag::Boolean,
            Self::Number(_) => TypeTag::Number,
            Self::String(_) => TypeTag::String,
            Self::Array(_) => TypeTag::Array,
            Self::Object(_) => TypeTag::Object,
        }
    }

    /// Textual form of this leaf: empty for null/undefined, the string itself
    /// for strings, JSON text for everything else.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null | Self::Undefined => String::new(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
            Self::Array(items) => Value::Array(items.clone()).to_string(),
            Self::Object(map) => Value::Object(map.clone()).to_string(),
        }
    }

    /// Comparison used when a caller overwrites a value in memory.
    ///
    /// Primitives compare by value. Arrays and objects are never shallow-equal,
    /// so assigning a container always counts as a change.
    pub fn shallow_eq(&self, other: &Leaf) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Undefined, Self::Undefined) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }

    /// Convert to a JSON value. `Undefined` has no JSON form and becomes `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null | Self::Undefined => Value::Null,
            Self::Boolean(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(items.clone()),
            Self::Object(map) => Value::Object(map.clone()),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            Self::Null | Self::Undefined => Value::Null,
            Self::Boolean(b) => Value::Bool(b),
            Self::Number(n) => Value::Number(n),
            Self::String(s) => Value::String(s),
            Self::Array(items) => Value::Array(items),
            Self::Object(map) => Value::Object(map),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<Value> for Leaf {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items),
            Value::Object(map) => Self::Object(map),
        }
    }
}

impl From<&Value> for Leaf {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<bool> for Leaf {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Leaf {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for Leaf {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Leaf {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become [`Leaf::Null`].
impl From<f64> for Leaf {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Leaf {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Leaf {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Dates are stored as ISO-8601 strings with millisecond precision.
impl From<DateTime<Utc>> for Leaf {
    fn from(at: DateTime<Utc>) -> Self {
        Self::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl From<Vec<Value>> for Leaf {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Map<String, Value>> for Leaf {
    fn from(map: Map<String, Value>) -> Self {
        Self::Object(map)
    }
}

impl<T: Into<Leaf>> From<Option<T>> for Leaf {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
