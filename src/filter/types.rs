use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::FilterError;

/// Comparison operators understood inside a field condition, e.g.
/// `{ "name": { "$regex": "piz", "$options": "i" } }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$ne")] Ne,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,
    #[serde(rename = "$regex")] Regex,
}

impl FilterOp {
    pub fn parse(key: &str) -> Result<Self, FilterError> {
        Ok(match key {
            "$eq" => FilterOp::Eq,
            "$ne" => FilterOp::Ne,
            "$gt" => FilterOp::Gt,
            "$gte" => FilterOp::Gte,
            "$lt" => FilterOp::Lt,
            "$lte" => FilterOp::Lte,
            "$regex" => FilterOp::Regex,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }
}

/// Query document accepted by a collection: filter, sort, skip and limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    pub where_clause: Option<Value>,
    pub order: Option<Value>,
    /// `0` means "no limit".
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FilterData {
    pub fn matching(where_clause: Value) -> Self {
        Self {
            where_clause: Some(where_clause),
            ..Default::default()
        }
    }
}

/// Location of a value inside a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    /// The `_id` pseudo-field, backed by the `id` column.
    Id,
    /// Dotted path into the JSON body, e.g. `addedBy.email`.
    Data(Vec<String>),
}

impl FieldPath {
    pub const ID_FIELD: &'static str = "_id";

    pub fn parse(field: &str) -> Result<Self, FilterError> {
        if field == Self::ID_FIELD {
            return Ok(FieldPath::Id);
        }
        let segments: Vec<String> = field.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty() || s.starts_with('$')) {
            return Err(FilterError::InvalidField(field.to_string()));
        }
        Ok(FieldPath::Data(segments))
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub field: FieldPath,
    pub operator: FilterOp,
    pub data: Value,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC NULLS FIRST",
            SortDirection::Desc => "DESC NULLS LAST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub field: FieldPath,
    pub sort: SortDirection,
}

/// Bind value for a generated statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Json(Value),
    Text(String),
    Path(Vec<String>),
    Uuid(Uuid),
    BigInt(i64),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
