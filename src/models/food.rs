//! Field names used by the food update endpoints differ from the names the
//! documents are stored under. The tables below are the single source of
//! truth for that translation; clients depend on the exact names.

use serde_json::{Map, Value};

/// One request field and the stored field it writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub input: &'static str,
    pub stored: &'static str,
}

const fn field(input: &'static str, stored: &'static str) -> FieldMapping {
    FieldMapping { input, stored }
}

/// `PATCH /api/v1/all-foods-items/:id`
pub const FOOD_SALES_FIELDS: &[FieldMapping] = &[
    field("totalSold", "totalSell"),
    field("quantity", "quantity"),
];

/// `PUT /api/v1/all-foods-items/:id`
pub const FOOD_DETAIL_FIELDS: &[FieldMapping] = &[
    field("foodName", "name"),
    field("foodImage", "image"),
    field("foodCategory", "category"),
    field("price", "price"),
    field("description", "description"),
    field("foodOrigin", "origin"),
    field("quantity", "quantity"),
];

/// Builds the `$set` document for an update. Every mapped field is written;
/// one missing from the request is written as `null`. Unmapped request
/// fields are dropped.
pub fn remap_fields(input: &Map<String, Value>, table: &[FieldMapping]) -> Map<String, Value> {
    table
        .iter()
        .map(|m| (m.stored.to_string(), input.get(m.input).cloned().unwrap_or(Value::Null)))
        .collect()
}
