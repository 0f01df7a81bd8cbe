use chrono::Utc;
use pathdoc_types::{codec, DecodeError, KeyPath, Leaf, ObjectId, TypeTag};
use serde::{Deserialize, Serialize};

/// Current time as milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// One stored leaf, keyed by `(object_id, key_path)`.
///
/// `value` is `None` for null and undefined leaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub object_id: ObjectId,
    pub key_path: KeyPath,
    pub value: Option<String>,
    pub value_type: TypeTag,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Row {
    /// Decode the stored value, failing on malformed text.
    pub fn decode(&self) -> Result<Leaf, DecodeError> {
        codec::decode(self.value.as_deref(), self.value_type)
    }
}

/// Remove the row at `(object_id, key_path)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowDelete {
    pub object_id: ObjectId,
    pub key_path: KeyPath,
}

/// Insert or overwrite the row at `(object_id, key_path)`.
///
/// On insert both timestamps are set to `timestamp`. On conflict the value,
/// type and `updated_at` are overwritten and `created_at` is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowUpsert {
    pub object_id: ObjectId,
    pub key_path: KeyPath,
    pub value: Option<String>,
    pub value_type: TypeTag,
    pub timestamp: i64,
}

impl RowUpsert {
    /// Build an upsert carrying the stored form of `leaf`.
    pub fn from_leaf(object_id: ObjectId, key_path: KeyPath, leaf: &Leaf, timestamp: i64) -> Self {
        Self {
            object_id,
            key_path,
            value: codec::encode(leaf),
            value_type: leaf.tag(),
            timestamp,
        }
    }

    /// The row this upsert produces when no row exists yet.
    pub fn to_new_row(&self) -> Row {
        Row {
            object_id: self.object_id.clone(),
            key_path: self.key_path.clone(),
            value: self.value.clone(),
            value_type: self.value_type,
            created_at: self.timestamp,
            updated_at: self.timestamp,
        }
    }

    /// Overwrite `row` in place, keeping its creation time.
    pub fn apply_to(&self, row: &mut Row) {
        row.value = self.value.clone();
        row.value_type = self.value_type;
        row.updated_at = self.timestamp;
    }
}

/// A single write in an atomic batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowOp {
    Delete(RowDelete),
    Upsert(RowUpsert),
}

impl RowOp {
    pub fn delete(object_id: ObjectId, key_path: KeyPath) -> Self {
        Self::Delete(RowDelete {
            object_id,
            key_path,
        })
    }

    pub fn upsert(object_id: ObjectId, key_path: KeyPath, leaf: &Leaf, timestamp: i64) -> Self {
        Self::Upsert(RowUpsert::from_leaf(object_id, key_path, leaf, timestamp))
    }

    pub fn object_id(&self) -> &ObjectId {
        match self {
            Self::Delete(d) => &d.object_id,
            Self::Upsert(u) => &u.object_id,
        }
    }

    pub fn key_path(&self) -> &KeyPath {
        match self {
            Self::Delete(d) => &d.key_path,
            Self::Upsert(u) => &u.key_path,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids() -> (ObjectId, KeyPath) {
        (ObjectId::new("doc").unwrap(), KeyPath::new("a.b").unwrap())
    }

    #[test]
    fn upsert_carries_tag_and_text() {
        let (id, path) = ids();
        let up = RowUpsert::from_leaf(id, path, &Leaf::from(json!([1, 2])), 7);
        assert_eq!(up.value.as_deref(), Some("[1,2]"));
        assert_eq!(up.value_type, TypeTag::Array);
    }

    #[test]
    fn null_upsert_stores_no_text() {
        let (id, path) = ids();
        let up = RowUpsert::from_leaf(id, path, &Leaf::Undefined, 7);
        assert_eq!(up.value, None);
        assert_eq!(up.value_type, TypeTag::Undefined);
        assert_eq!(up.to_new_row().decode().unwrap(), Leaf::Null);
    }

    #[test]
    fn apply_preserves_created_at() {
        let (id, path) = ids();
        let mut row = RowUpsert::from_leaf(id.clone(), path.clone(), &Leaf::from(1), 100).to_new_row();
        RowUpsert::from_leaf(id, path, &Leaf::from("x"), 250).apply_to(&mut row);
        assert_eq!(row.created_at, 100);
        assert_eq!(row.updated_at, 250);
        assert_eq!(row.decode().unwrap(), Leaf::from("x"));
    }

    #[test]
    fn malformed_row_fails_strict_decode() {
        let (id, path) = ids();
        let row = Row {
            object_id: id,
            key_path: path,
            value: Some("{oops".into()),
            value_type: TypeTag::Object,
            created_at: 0,
            updated_at: 0,
        };
        assert!(matches!(
            row.decode(),
            Err(DecodeError::MalformedStructure { expected: TypeTag::Object, .. })
        ));
    }

    #[test]
    fn op_accessors() {
        let (id, path) = ids();
        let op = RowOp::delete(id.clone(), path.clone());
        assert!(op.is_delete());
        assert_eq!(op.object_id(), &id);
        assert_eq!(op.key_path(), &path);
    }

    #[test]
    fn row_serializes_with_column_names() {
        let (id, path) = ids();
        let row = RowUpsert::from_leaf(id, path, &Leaf::from(true), 5).to_new_row();
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            json!({
                "object_id": "doc",
                "key_path": "a.b",
                "value": "true",
                "value_type": "boolean",
                "created_at": 5,
                "updated_at": 5
            })
        );
    }
}
