//! Leaf value codec: classification, textual serialization and tag-directed
//! decoding.
//!
//! Decoding comes in two flavours. [`decode`] is strict and reports malformed
//! text as a [`DecodeError`]. [`decode_lenient`] never fails: unparsable
//! numbers become `0` and malformed structured text becomes an empty array or
//! object, so one corrupt field cannot make a whole document unreadable.

use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::error::DecodeError;
use crate::leaf::{Leaf, TypeTag};

/// Classify a leaf into its type tag.
pub fn classify(leaf: &Leaf) -> TypeTag {
    leaf.tag()
}

/// Serialize a leaf to its textual form.
pub fn serialize(leaf: &Leaf) -> String {
    leaf.to_text()
}

/// Storage column form of a leaf. Null and undefined are stored as `NULL`.
pub fn encode(leaf: &Leaf) -> Option<String> {
    match leaf {
        Leaf::Null | Leaf::Undefined => None,
        other => Some(other.to_text()),
    }
}

/// Decode stored text under `tag`, failing on malformed input.
///
/// Absent or empty text always decodes to [`Leaf::Null`], whatever the tag,
/// so an empty string does not survive a store round trip.
pub fn decode(text: Option<&str>, tag: TypeTag) -> Result<Leaf, DecodeError> {
    let text = match text {
        None | Some("") => return Ok(Leaf::Null),
        Some(text) => text,
    };
    match tag {
        TypeTag::Null => Ok(Leaf::Null),
        TypeTag::Undefined => Ok(Leaf::Undefined),
        TypeTag::String => Ok(Leaf::String(text.to_string())),
        TypeTag::Number => parse_number(text)
            .map(Leaf::Number)
            .ok_or_else(|| DecodeError::InvalidNumber {
                text: text.to_string(),
            }),
        TypeTag::Boolean => match text {
            "true" => Ok(Leaf::Boolean(true)),
            "false" => Ok(Leaf::Boolean(false)),
            _ => Err(DecodeError::InvalidBoolean {
                text: text.to_string(),
            }),
        },
        TypeTag::Array => match parse_structure(text, tag)? {
            Value::Array(items) => Ok(Leaf::Array(items)),
            _ => Err(wrong_kind(text, tag)),
        },
        TypeTag::Object => match parse_structure(text, tag)? {
            Value::Object(map) => Ok(Leaf::Object(map)),
            _ => Err(wrong_kind(text, tag)),
        },
    }
}

/// Decode stored text under `tag`, substituting typed empty values for
/// malformed input.
///
/// | tag     | malformed input becomes |
/// |---------|-------------------------|
/// | number  | `0`                     |
/// | boolean | `false` (anything but `"true"`) |
/// | array   | `[]`                    |
/// | object  | `{}`                    |
pub fn decode_lenient(text: Option<&str>, tag: TypeTag) -> Leaf {
    match decode(text, tag) {
        Ok(leaf) => leaf,
        Err(e) => {
            warn!(%tag, error = %e, "substituting fallback for undecodable value");
            fallback_for(tag)
        }
    }
}

/// The typed empty value substituted by [`decode_lenient`].
pub fn fallback_for(tag: TypeTag) -> Leaf {
    match tag {
        TypeTag::Number => Leaf::Number(Number::from(0)),
        TypeTag::Boolean => Leaf::Boolean(false),
        TypeTag::Array => Leaf::Array(Vec::new()),
        TypeTag::Object => Leaf::Object(Map::new()),
        TypeTag::String => Leaf::String(String::new()),
        TypeTag::Undefined => Leaf::Undefined,
        TypeTag::Null => Leaf::Null,
    }
}

/// Structural change test.
///
/// Primitives compare by value. Arrays and objects compare by serialized
/// text, so two objects holding the same entries in a different key order
/// count as changed.
pub fn has_value_changed(old: &Leaf, new: &Leaf) -> bool {
    if old.tag() != new.tag() {
        return true;
    }
    if old.tag().is_primitive() {
        return old != new;
    }
    serialize(old) != serialize(new)
}

fn parse_number(text: &str) -> Option<Number> {
    serde_json::from_str::<Number>(text.trim()).ok()
}

fn parse_structure(text: &str, expected: TypeTag) -> Result<Value, DecodeError> {
    serde_json::from_str(text).map_err(|e| DecodeError::MalformedStructure {
        expected,
        text: text.to_string(),
        reason: e.to_string(),
    })
}

fn wrong_kind(text: &str, expected: TypeTag) -> DecodeError {
    DecodeError::MalformedStructure {
        expected,
        text: text.to_string(),
        reason: "parsed to a different JSON kind".into(),
    }
}
