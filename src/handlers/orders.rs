use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::into_object;
use crate::database::{DeleteResult, Document, InsertOneResult};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BuyerQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOrderQuery {
    pub food_name: Option<String>,
}

impl BuyerQuery {
    pub fn filter_data(&self) -> FilterData {
        match self.email.as_deref().filter(|s| !s.is_empty()) {
            Some(email) => FilterData::matching(json!({ "buyerEmail": email })),
            None => FilterData::default(),
        }
    }
}

impl DeleteOrderQuery {
    /// Without `foodName` this matches orders that have no food name.
    pub fn filter_data(&self) -> FilterData {
        FilterData::matching(json!({ "foodName": self.food_name }))
    }
}

/// POST /api/v1/create-order
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = state.db.orders().insert_one(into_object(body)?).await?;
    Ok(Json(result))
}

/// GET /api/v1/orders[?email]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<BuyerQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let orders = state.db.orders().find(query.filter_data()).await?;
    Ok(Json(orders))
}

/// DELETE /api/v1/orders?foodName
///
/// Removes only the oldest matching order, even when several share the name.
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteOrderQuery>,
) -> Result<Json<DeleteResult>, ApiError> {
    let result = state.db.orders().delete_one(query.filter_data()).await?;
    if result.deleted_count == 0 {
        tracing::debug!("No order matched foodName {:?}", query.food_name);
    }
    Ok(Json(result))
}
