use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::{Map, Value};
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::Database;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// App state over a pool that never connects. The port is closed so any
/// handler that reaches the database fails fast instead of hanging.
pub fn offline_state() -> AppState {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.database.url = Some("postgres://srh@127.0.0.1:1/srh_restaurant".to_string());
    config.database.connection_timeout = 1;

    let db = Database::connect_lazy(&config.database).expect("lazy pool");
    AppState::new(db, config).expect("state")
}

pub fn token_for(state: &AppState, email: &str) -> String {
    let mut payload = Map::new();
    payload.insert("email".to_string(), Value::String(email.to_string()));
    state.signer().issue(payload).expect("token")
}

pub async fn send(router: Router, request: Request<Body>) -> Response {
    router.oneshot(request).await.expect("infallible")
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}
