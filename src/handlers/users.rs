use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::database::InsertOneResult;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub user: Map<String, Value>,
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = state.db.users().insert_one(body.user).await?;
    Ok(Json(result))
}
