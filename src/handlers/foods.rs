use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::into_object;
use crate::database::{Document, InsertOneResult, UpdateResult};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::models::food::{remap_fields, FOOD_DETAIL_FIELDS, FOOD_SALES_FIELDS};
use crate::state::AppState;

pub const TOP_SELLING_LIMIT: i64 = 6;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub food_name: Option<String>,
}

impl CatalogQuery {
    /// Page 1 when unset. Pages below 1 are not clamped, so the resulting
    /// negative skip reaches the database as-is.
    pub fn skip(&self) -> i64 {
        let page = self.page.unwrap_or(1);
        page.saturating_sub(1).saturating_mul(self.limit.unwrap_or(0))
    }

    pub fn filter_data(&self) -> FilterData {
        let where_clause = match self.food_name.as_deref().filter(|s| !s.is_empty()) {
            Some(name) => json!({ "name": { "$regex": name, "$options": "i" } }),
            None => json!({}),
        };
        FilterData {
            where_clause: Some(where_clause),
            order: None,
            limit: self.limit,
            offset: Some(self.skip()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub total: i64,
    pub result: Vec<Document>,
}

#[derive(Debug, Deserialize)]
pub struct CreatorQuery {
    pub email: Option<String>,
}

/// GET /api/v1/all-foods-items?page&limit&foodName
///
/// `total` counts the whole collection, not just the filtered matches.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>, ApiError> {
    let foods = state.db.foods();
    let result = foods.find(query.filter_data()).await?;
    let total = foods.count_documents(FilterData::default()).await?;

    tracing::debug!("Catalog page: {} of {} foods", result.len(), total);
    Ok(Json(CatalogPage { total, result }))
}

/// GET /api/v1/all-foods-items/:foodId
///
/// Responds with `null` when no document has the id.
pub async fn get(
    State(state): State<AppState>,
    Path(food_id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    let id = parse_id(&food_id)?;
    let food = state.db.foods().find_one(by_id(id)).await?;
    Ok(Json(food))
}

/// POST /api/v1/all-foods-items
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = state.db.foods().insert_one(into_object(body)?).await?;
    Ok(Json(result))
}

/// PATCH /api/v1/all-foods-items/:id - record a sale (`totalSold`, `quantity`)
pub async fn update_sales(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    let set = remap_fields(&into_object(body)?, FOOD_SALES_FIELDS);
    let result = state.db.foods().update_one(by_id(id), set).await?;
    Ok(Json(result))
}

/// PUT /api/v1/all-foods-items/:id - replace the descriptive fields
pub async fn update_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    let set = remap_fields(&into_object(body)?, FOOD_DETAIL_FIELDS);
    let result = state.db.foods().update_one(by_id(id), set).await?;
    Ok(Json(result))
}

/// GET /api/v1/top-selling-foods
pub async fn top_selling(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let filter_data = FilterData {
        where_clause: None,
        order: Some(json!({ "totalSell": -1 })),
        limit: Some(TOP_SELLING_LIMIT),
        offset: None,
    };
    let foods = state.db.foods().find(filter_data).await?;
    Ok(Json(foods))
}

/// GET /api/v1/myAddedFoodItems?email
///
/// Ownership of `email` is enforced by the identity gate before this runs.
pub async fn added_by(
    State(state): State<AppState>,
    Query(query): Query<CreatorQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let foods = state
        .db
        .foods()
        .find(FilterData::matching(json!({ "addedBy.email": query.email })))
        .await?;
    Ok(Json(foods))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}

fn by_id(id: Uuid) -> FilterData {
    FilterData::matching(json!({ "_id": id.to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;

    fn query(page: Option<i64>, limit: Option<i64>, food_name: Option<&str>) -> CatalogQuery {
        CatalogQuery {
            page,
            limit,
            food_name: food_name.map(str::to_string),
        }
    }

    #[test]
    fn skip_is_page_offset_times_limit() {
        assert_eq!(query(Some(3), Some(10), None).skip(), 20);
        assert_eq!(query(None, Some(10), None).skip(), 0);
        assert_eq!(query(Some(2), None, None).skip(), 0);
        assert_eq!(query(Some(0), Some(5), None).skip(), -5);
        assert_eq!(query(Some(i64::MIN), Some(i64::MAX), None).skip(), i64::MIN);
    }

    #[test]
    fn name_search_is_case_insensitive_regex() {
        let data = query(Some(1), Some(9), Some("piz")).filter_data();
        assert_eq!(
            data.where_clause,
            Some(json!({ "name": { "$regex": "piz", "$options": "i" } }))
        );

        let mut filter = Filter::new("foods").unwrap();
        filter.assign(data).unwrap();
        let sql = filter.to_sql().unwrap();
        assert!(sql.query.contains("~*"), "{}", sql.query);
        assert!(sql.query.contains("LIMIT"), "{}", sql.query);
    }

    #[test]
    fn unfiltered_listing_matches_everything() {
        let data = query(None, None, None).filter_data();
        assert_eq!(data.where_clause, Some(json!({})));
        assert_eq!(data.offset, Some(0));
    }

    #[test]
    fn empty_search_box_means_no_filter() {
        let data = query(Some(1), Some(9), Some("")).filter_data();
        assert_eq!(data.where_clause, Some(json!({})));
    }

    #[test]
    fn ids_must_be_uuids() {
        assert!(parse_id("6d9f3c1e-8a7b-4c2d-9e0f-1a2b3c4d5e6f").is_ok());
        let err = parse_id("65f0c0ffee").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
