use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    Json,
};
use serde_json::{json, Value};

use super::into_object;
use crate::auth::cookie::token_cookie;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/create-token
///
/// Signs the posted payload and hands it back as the `token` cookie. The
/// token itself is never in the body.
pub async fn create_token(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(HeaderMap, Json<Value>), ApiError> {
    let payload = into_object(body)?;
    let email = payload.get("email").and_then(Value::as_str).unwrap_or("<none>").to_string();

    let token = state.signer().issue(payload)?;
    let cookie = token_cookie(&token, state.config.security.cookie_secure);
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to build cookie: {}", e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, cookie);

    tracing::info!("Issued token for {}", email);
    Ok((headers, Json(json!({ "success": true }))))
}
