use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::middleware::identity_gate;
use crate::state::AppState;

pub mod paths {
    pub const ROOT: &str = "/";
    pub const HEALTH: &str = "/health";
    pub const CREATE_TOKEN: &str = "/api/v1/create-token";
    pub const USERS: &str = "/api/v1/users";
    pub const FOODS: &str = "/api/v1/all-foods-items";
    pub const FOOD_ITEM: &str = "/api/v1/all-foods-items/:id";
    pub const TOP_SELLING: &str = "/api/v1/top-selling-foods";
    pub const CREATE_ORDER: &str = "/api/v1/create-order";
    pub const ORDERS: &str = "/api/v1/orders";
    pub const MY_FOODS: &str = "/api/v1/myAddedFoodItems";
    pub const REVIEWS: &str = "/api/v1/reviews";
}

/// Full application router. Access control for every route comes from the
/// policy table held by the identity gate.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origin);

    Router::new()
        .route(paths::ROOT, get(handlers::system::root))
        .route(paths::HEALTH, get(handlers::system::health))
        .merge(auth_routes())
        .merge(food_routes())
        .merge(order_routes())
        .route(paths::REVIEWS, get(handlers::reviews::list))
        .route_layer(from_fn_with_state(state.gate.clone(), identity_gate))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(paths::CREATE_TOKEN, post(handlers::auth::create_token))
        .route(paths::USERS, post(handlers::users::create))
}

fn food_routes() -> Router<AppState> {
    use handlers::foods;

    Router::new()
        .route(paths::FOODS, get(foods::list).post(foods::create))
        .route(
            paths::FOOD_ITEM,
            get(foods::get).patch(foods::update_sales).put(foods::update_details),
        )
        .route(paths::TOP_SELLING, get(foods::top_selling))
        .route(paths::MY_FOODS, get(foods::added_by))
}

fn order_routes() -> Router<AppState> {
    use handlers::orders;

    Router::new()
        .route(paths::CREATE_ORDER, post(orders::create))
        .route(paths::ORDERS, get(orders::list).delete(orders::delete))
}

/// Single allowed origin with credentials, so the browser sends the token
/// cookie cross-site.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
            layer
        }
    }
}
