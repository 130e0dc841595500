use serde_json::{Map, Value};
use sqlx::{self, postgres::PgArguments, PgPool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use crate::database::document::{DeleteResult, Document, InsertOneResult, UpdateResult};
use crate::database::manager::DatabaseError;
use crate::filter::{FieldPath, Filter, FilterData, SqlParam};

/// Handle to one document collection.
///
/// Each operation issues exactly one statement. Nothing here spans more than
/// one collection or retries on failure.
pub struct Collection {
    name: String,
    pool: PgPool,
}

impl Collection {
    pub fn new(name: impl Into<String>, pool: PgPool) -> Self {
        Self { name: name.into(), pool }
    }

    fn filter(&self, filter_data: FilterData) -> Result<Filter, DatabaseError> {
        let mut filter = Filter::new(&self.name)?;
        filter.assign(filter_data)?;
        Ok(filter)
    }

    pub async fn ensure_exists(&self) -> Result<(), DatabaseError> {
        let filter = Filter::new(&self.name)?;
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\
             \"id\" UUID PRIMARY KEY, \
             \"data\" JSONB NOT NULL DEFAULT '{{}}'::jsonb, \
             \"created_at\" TIMESTAMPTZ NOT NULL DEFAULT now())",
            filter.collection()
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Stores the document as given. A client supplied `_id` is discarded in
    /// favour of a generated one.
    pub async fn insert_one(&self, mut document: Map<String, Value>) -> Result<InsertOneResult, DatabaseError> {
        let filter = Filter::new(&self.name)?;
        document.remove(FieldPath::ID_FIELD);
        let id = Uuid::new_v4();

        let sql = format!("INSERT INTO \"{}\" (\"id\", \"data\") VALUES ($1, $2)", filter.collection());
        sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(document))
            .execute(&self.pool)
            .await?;

        debug!(collection = %self.name, %id, "inserted document");
        Ok(InsertOneResult { acknowledged: true, inserted_id: id })
    }

    pub async fn find(&self, filter_data: FilterData) -> Result<Vec<Document>, DatabaseError> {
        let sql = self.filter(filter_data)?.to_sql()?;
        debug!(collection = %self.name, sql = %sql.query, "find");

        let mut q = sqlx::query_as::<_, Document>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    pub async fn find_one(&self, filter_data: FilterData) -> Result<Option<Document>, DatabaseError> {
        let sql = self.filter(filter_data)?.to_first_sql()?;
        debug!(collection = %self.name, sql = %sql.query, "find_one");

        let mut q = sqlx::query_as::<_, Document>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_optional(&self.pool).await?)
    }

    pub async fn count_documents(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        let sql = self.filter(filter_data)?.to_count_sql()?;

        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    /// `$set` on the first matching document. Only top-level fields may be set.
    pub async fn update_one(&self, filter_data: FilterData, set: Map<String, Value>) -> Result<UpdateResult, DatabaseError> {
        if let Some(key) = set.keys().find(|k| k.is_empty() || k.contains('.') || k.starts_with('$') || *k == FieldPath::ID_FIELD) {
            return Err(DatabaseError::QueryError(format!("field '{}' cannot be set", key)));
        }

        let filter = self.filter(filter_data)?;
        let first = filter.to_first_sql()?;
        let mut params = first.params;
        params.push(SqlParam::Json(Value::Object(set)));
        let set_param = params.len();

        let sql = format!(
            "WITH target AS ({first} FOR UPDATE), \
             updated AS (\
               UPDATE \"{table}\" AS d SET \"data\" = d.\"data\" || ${set} \
               FROM target \
               WHERE d.\"id\" = target.\"id\" AND (target.\"data\" || ${set}) IS DISTINCT FROM target.\"data\" \
               RETURNING d.\"id\") \
             SELECT (SELECT COUNT(*) FROM target) AS matched, (SELECT COUNT(*) FROM updated) AS modified",
            first = first.query,
            table = filter.collection(),
            set = set_param,
        );
        debug!(collection = %self.name, sql = %sql, "update_one");

        let mut q = sqlx::query(&sql);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: row.try_get("matched")?,
            modified_count: row.try_get("modified")?,
            upserted_count: 0,
            upserted_id: None,
        })
    }

    /// Removes at most one document: the oldest match in sort order.
    pub async fn delete_one(&self, filter_data: FilterData) -> Result<DeleteResult, DatabaseError> {
        let filter = self.filter(filter_data)?;
        let first = filter.to_first_sql()?;
        let sql = format!(
            "WITH target AS ({}) DELETE FROM \"{}\" AS d USING target WHERE d.\"id\" = target.\"id\"",
            first.query,
            filter.collection()
        );
        debug!(collection = %self.name, sql = %sql, "delete_one");

        let mut q = sqlx::query(&sql);
        for p in first.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected() as i64,
        })
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match p {
        SqlParam::Json(v) => q.bind(v),
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Path(path) => q.bind(path),
        SqlParam::Uuid(id) => q.bind(*id),
        SqlParam::BigInt(n) => q.bind(*n),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    match p {
        SqlParam::Json(v) => q.bind(v),
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Path(path) => q.bind(path),
        SqlParam::Uuid(id) => q.bind(*id),
        SqlParam::BigInt(n) => q.bind(*n),
    }
}
