use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, SqlParam, SqlResult};

/// Statement builder for one collection table `(id, data, created_at)`.
pub struct Filter {
    collection: String,
    where_data: Value,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(collection: impl Into<String>) -> Result<Self, FilterError> {
        let collection = collection.into();
        Self::validate_collection_name(&collection)?;
        Ok(Self {
            collection,
            where_data: Value::Null,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        self.limit(data.limit, data.offset);
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = conditions;
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    /// Values are not range-checked here; a negative limit or offset is left
    /// for the database to reject.
    pub fn limit(&mut self, limit: Option<i64>, offset: Option<i64>) -> &mut Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let mut params = vec![];
        let where_clause = FilterWhere::generate(&self.where_data, &mut params)?;
        let order_clause = FilterOrder::generate(&self.order_data, &mut params);
        let limit_clause = self.build_limit_clause(&mut params);

        let query = [
            "SELECT \"id\", \"data\"".to_string(),
            format!("FROM \"{}\"", self.collection),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// First matching document in sort order; used by the single-document
    /// write operations. Ignores limit/offset.
    pub fn to_first_sql(&self) -> Result<SqlResult, FilterError> {
        let mut params = vec![];
        let where_clause = FilterWhere::generate(&self.where_data, &mut params)?;
        let order_clause = FilterOrder::generate(&self.order_data, &mut params);
        let query = format!(
            "SELECT \"id\", \"data\" FROM \"{}\" WHERE {} {} LIMIT 1",
            self.collection, where_clause, order_clause
        );
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let mut params = vec![];
        let where_clause = FilterWhere::generate(&self.where_data, &mut params)?;
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.collection, where_clause);
        Ok(SqlResult { query, params })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn validate_collection_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidCollection(format!("Invalid collection name format: {:?}", name)));
        }
        Ok(())
    }

    // A limit of zero means "no limit", as in a document store cursor.
    fn build_limit_clause(&self, params: &mut Vec<SqlParam>) -> String {
        let mut clause = vec![];
        if let Some(l) = self.limit.filter(|l| *l != 0) {
            params.push(SqlParam::BigInt(l));
            clause.push(format!("LIMIT ${}", params.len()));
        }
        if let Some(o) = self.offset.filter(|o| *o != 0) {
            params.push(SqlParam::BigInt(o));
            clause.push(format!("OFFSET ${}", params.len()));
        }
        clause.join(" ")
    }
}
