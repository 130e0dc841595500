use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::filter::FieldPath;

/// A stored document: the generated id plus the schema-less body.
///
/// Serializes as the body with `_id` first, which is the shape clients see.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub data: Value,
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = self.data.as_object();
        let mut map = serializer.serialize_map(Some(1 + body.map_or(0, Map::len)))?;
        map.serialize_entry(FieldPath::ID_FIELD, &self.id)?;
        if let Some(body) = body {
            for (k, v) in body.iter().filter(|(k, _)| k.as_str() != FieldPath::ID_FIELD) {
                map.serialize_entry(k, v)?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: i64,
    pub modified_count: i64,
    pub upserted_count: i64,
    pub upserted_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: i64,
}
