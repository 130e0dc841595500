use axum::{extract::State, Json};

use crate::database::Document;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::state::AppState;

/// GET /api/v1/reviews
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let reviews = state.db.reviews().find(FilterData::default()).await?;
    Ok(Json(reviews))
}
