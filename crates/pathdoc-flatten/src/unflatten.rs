//! Flat key-path mapping → nested document.

use indexmap::IndexMap;
use pathdoc_types::{KeyPath, Leaf};
use serde_json::{Map, Value};

use crate::flatten::FlatMap;

/// Rebuild a nested document from typed leaves.
///
/// Paths are applied in mapping order. Intermediate segments are created as
/// objects; an intermediate segment already holding a non-object value is
/// replaced by an object, so when two paths conflict the later one wins.
///
/// ```
/// use pathdoc_flatten::{flatten, unflatten};
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": 1}, "arr": [1, 2], "val": null});
/// assert_eq!(unflatten(&flatten(&doc).unwrap()), doc);
/// ```
pub fn unflatten(flat: &FlatMap) -> Value {
    build(flat.iter().map(|(path, leaf)| (path, leaf.to_json())))
}

/// Rebuild a nested document from untagged leaf text.
///
/// Each leaf is interpreted with [`parse_value`].
pub fn unflatten_text(flat: &IndexMap<KeyPath, String>) -> Value {
    build(flat.iter().map(|(path, text)| (path, parse_value(text).into_json())))
}

/// Interpret untagged leaf text.
///
/// - `""` is `null`
/// - `"{}"` is an empty object
/// - text bracketed by `[`/`]` or `{`/`}` is parsed as JSON, falling back to
///   the literal string when it does not parse
/// - anything else is the literal string
pub fn parse_value(text: &str) -> Leaf {
    if text.is_empty() {
        return Leaf::Null;
    }
    if text == "{}" {
        return Leaf::Object(Map::new());
    }
    let bracketed = (text.starts_with('[') && text.ends_with(']'))
        || (text.starts_with('{') && text.ends_with('}'));
    if bracketed {
        if let Ok(value @ (Value::Array(_) | Value::Object(_))) = serde_json::from_str(text) {
            return Leaf::from(value);
        }
    }
    Leaf::String(text.to_string())
}

fn build<'a>(entries: impl Iterator<Item = (&'a KeyPath, Value)>) -> Value {
    let mut root = Map::new();
    'entries: for (path, value) in entries {
        let segments: Vec<&str> = path.segments().collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        let mut node = &mut root;
        for segment in parents {
            let slot = node
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            // A scalar on the way down is replaced by the deeper path.
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            match slot {
                Value::Object(child) => node = child,
                _ => continue 'entries,
            }
        }
        node.insert((*last).to_string(), value);
    }
    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use pathdoc_types::TypeTag;
    use proptest::prelude::*;
    use serde_json::json;

    fn path(s: &str) -> KeyPath {
        KeyPath::new(s).unwrap()
    }

    fn flat(entries: &[(&str, Leaf)]) -> FlatMap {
        entries
            .iter()
            .map(|(p, leaf)| (path(p), leaf.clone()))
            .collect()
    }

    #[test]
    fn dotted_paths_become_nested_objects() {
        let doc = unflatten(&flat(&[("a.b", Leaf::from(1))]));
        assert_eq!(doc, json!({"a": {"b": 1}}));
    }

    #[test]
    fn array_leaf_restored() {
        let doc = unflatten(&flatten(&json!({"arr": [1, 2]})).unwrap());
        assert_eq!(doc, json!({"arr": [1, 2]}));
    }

    #[test]
    fn null_leaf_restored() {
        let doc = unflatten(&flatten(&json!({"val": null})).unwrap());
        assert_eq!(doc, json!({"val": null}));
    }

    #[test]
    fn empty_object_leaf_restored() {
        let doc = unflatten(&flatten(&json!({"meta": {}})).unwrap());
        assert_eq!(doc, json!({"meta": {}}));
    }

    #[test]
    fn undefined_leaf_reads_as_null() {
        let doc = unflatten(&flat(&[("gone", Leaf::Undefined)]));
        assert_eq!(doc, json!({"gone": null}));
    }

    #[test]
    fn strings_that_look_like_json_stay_strings() {
        let doc = unflatten(&flat(&[("s", Leaf::from("[1,2]"))]));
        assert_eq!(doc, json!({"s": "[1,2]"}));
    }

    #[test]
    fn later_path_overwrites_scalar_intermediate() {
        let doc = unflatten(&flat(&[("a", Leaf::from(1)), ("a.b", Leaf::from(2))]));
        assert_eq!(doc, json!({"a": {"b": 2}}));
    }

    #[test]
    fn later_scalar_overwrites_object() {
        let doc = unflatten(&flat(&[("a.b", Leaf::from(2)), ("a", Leaf::from(1))]));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn object_leaf_merges_with_deeper_paths() {
        let doc = unflatten(&flat(&[
            ("a", Leaf::from(json!({"x": 1}))),
            ("a.y", Leaf::from(2)),
        ]));
        assert_eq!(doc, json!({"a": {"x": 1, "y": 2}}));
    }

    #[test]
    fn empty_mapping_is_empty_object() {
        assert_eq!(unflatten(&FlatMap::new()), json!({}));
    }

    // -----------------------------------------------------------------------
    // Untagged text
    // -----------------------------------------------------------------------

    #[test]
    fn parse_value_rules() {
        assert_eq!(parse_value(""), Leaf::Null);
        assert_eq!(parse_value("{}").tag(), TypeTag::Object);
        assert_eq!(parse_value("[1,2]"), Leaf::from(json!([1, 2])));
        assert_eq!(parse_value(r#"{"a":1}"#), Leaf::from(json!({"a": 1})));
        assert_eq!(parse_value("[not json]"), Leaf::from("[not json]"));
        assert_eq!(parse_value("{broken"), Leaf::from("{broken"));
        assert_eq!(parse_value("42"), Leaf::from("42"));
        assert_eq!(parse_value("plain"), Leaf::from("plain"));
    }

    #[test]
    fn unflatten_text_parses_each_leaf() {
        let mut text = IndexMap::new();
        text.insert(path("a.list"), "[1,2]".to_string());
        text.insert(path("a.name"), "ada".to_string());
        text.insert(path("gone"), String::new());
        assert_eq!(
            unflatten_text(&text),
            json!({"a": {"list": [1, 2], "name": "ada"}, "gone": null})
        );
    }

    // -----------------------------------------------------------------------
    // Round trip
    // -----------------------------------------------------------------------

    fn arb_key() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,6}"
    }

    fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
            "[ -~]{0,12}".prop_map(Value::String),
            prop::collection::vec(any::<i32>().prop_map(|n| json!(n)), 0..4).prop_map(Value::Array),
        ]
    }

    fn arb_document() -> impl Strategy<Value = Value> {
        let leaf = arb_scalar();
        let tree = leaf.prop_recursive(3, 24, 4, |inner| {
            prop::collection::vec((arb_key(), inner), 0..4).prop_map(|pairs| {
                Value::Object(pairs.into_iter().collect::<Map<String, Value>>())
            })
        });
        prop::collection::vec((arb_key(), tree), 0..5)
            .prop_map(|pairs| Value::Object(pairs.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn flatten_round_trips(doc in arb_document()) {
            let flat = flatten(&doc).unwrap();
            prop_assert_eq!(unflatten(&flat), doc);
        }
    }
}
