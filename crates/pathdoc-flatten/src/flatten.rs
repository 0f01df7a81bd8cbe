//! Nested document → flat key-path mapping.

use indexmap::IndexMap;
use pathdoc_types::{KeyPath, Leaf};
use serde_json::{Map, Value};

use crate::error::{FlattenError, FlattenResult};

/// Ordered mapping from key path to leaf.
///
/// Iteration order is insertion order, which for [`flatten`] is the
/// document's own key order.
pub type FlatMap = IndexMap<KeyPath, Leaf>;

/// Flatten a document into key-path leaves.
///
/// - Non-empty objects are recursed into, one segment per key.
/// - Empty objects become an `{}` leaf.
/// - Arrays are opaque leaves and are never recursed into.
/// - `null` and primitives are leaves as-is.
///
/// The root must be an object; an empty root yields an empty mapping.
///
/// ```
/// use pathdoc_flatten::flatten;
/// use serde_json::json;
///
/// let flat = flatten(&json!({"a": {"b": 1}, "tags": ["x"]})).unwrap();
/// let paths: Vec<&str> = flat.keys().map(|p| p.as_str()).collect();
/// assert_eq!(paths, vec!["a.b", "tags"]);
/// assert_eq!(flat[1].to_text(), r#"["x"]"#);
/// ```
pub fn flatten(document: &Value) -> FlattenResult<FlatMap> {
    let Value::Object(root) = document else {
        return Err(FlattenError::NotAnObject {
            found: Leaf::from(document).tag(),
        });
    };
    flatten_object(root)
}

/// Flatten an object map. See [`flatten`].
pub fn flatten_object(root: &Map<String, Value>) -> FlattenResult<FlatMap> {
    let mut out = FlatMap::new();
    flatten_into(None, root, &mut out)?;
    Ok(out)
}

fn flatten_into(
    prefix: Option<&KeyPath>,
    object: &Map<String, Value>,
    out: &mut FlatMap,
) -> FlattenResult<()> {
    for (key, value) in object {
        let path = match prefix {
            Some(parent) => parent.child(key)?,
            None => KeyPath::new(key.as_str())?,
        };
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(Some(&path), child, out)?,
            leaf => {
                out.insert(path, Leaf::from(leaf));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathdoc_types::TypeTag;
    use serde_json::json;

    fn path(s: &str) -> KeyPath {
        KeyPath::new(s).unwrap()
    }

    #[test]
    fn nested_objects_become_dotted_paths() {
        let flat = flatten(&json!({"a": {"b": 1}})).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[&path("a.b")], Leaf::from(1));
    }

    #[test]
    fn arrays_are_opaque_leaves() {
        let flat = flatten(&json!({"arr": [1, 2]})).unwrap();
        let leaf = &flat[&path("arr")];
        assert_eq!(leaf.tag(), TypeTag::Array);
        assert_eq!(leaf.to_text(), "[1,2]");
    }

    #[test]
    fn arrays_of_objects_are_not_exploded() {
        let flat = flatten(&json!({"rows": [{"id": 1}, {"id": 2}]})).unwrap();
        assert_eq!(flat.len(), 1);
        assert!(flat.contains_key(&path("rows")));
    }

    #[test]
    fn null_leaf_has_empty_text() {
        let flat = flatten(&json!({"val": null})).unwrap();
        assert_eq!(flat[&path("val")], Leaf::Null);
        assert_eq!(flat[&path("val")].to_text(), "");
    }

    #[test]
    fn empty_object_becomes_sentinel_leaf() {
        let flat = flatten(&json!({"meta": {}, "a": {"b": {}}})).unwrap();
        assert_eq!(flat[&path("meta")].to_text(), "{}");
        assert_eq!(flat[&path("a.b")].tag(), TypeTag::Object);
    }

    #[test]
    fn empty_root_flattens_to_nothing() {
        assert!(flatten(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn order_follows_document_key_order() {
        let flat = flatten(&json!({"z": 1, "a": {"y": 2, "b": 3}, "m": 4})).unwrap();
        let paths: Vec<&str> = flat.keys().map(KeyPath::as_str).collect();
        assert_eq!(paths, vec!["z", "a.y", "a.b", "m"]);
    }

    #[test]
    fn dates_flatten_as_strings() {
        use chrono::{TimeZone, Utc};
        let at = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        let doc = json!({"created": Leaf::from(at).into_json()});
        let flat = flatten(&doc).unwrap();
        assert_eq!(flat[&path("created")], Leaf::from("2023-01-02T03:04:05.000Z"));
    }

    #[test]
    fn non_object_root_rejected() {
        assert_eq!(
            flatten(&json!([1])).unwrap_err(),
            FlattenError::NotAnObject { found: TypeTag::Array }
        );
        assert!(flatten(&json!(3)).is_err());
    }

    #[test]
    fn empty_key_rejected() {
        assert!(matches!(
            flatten(&json!({"a": {"": 1}})),
            Err(FlattenError::InvalidKey(_))
        ));
        assert!(flatten(&json!({"": 1})).is_err());
    }
}
