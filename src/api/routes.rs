use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware, require_user};

/// Creates the application router with all routes
pub fn create_router(state: AppState, cors_allowed_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes(state.clone()))
        .layer(cors_layer(cors_allowed_origin))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Routes under /api, all requiring a signed-in user
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/titles", get(handlers::get_titles))
        .route("/genres", get(handlers::get_genres))
        .route("/favorites", get(handlers::get_favorites))
        .route(
            "/favorites/:id",
            post(handlers::add_favorite).delete(handlers::remove_favorite),
        )
        .route("/watch-later", get(handlers::get_watch_later))
        .route(
            "/watch-later/:id",
            post(handlers::add_watch_later).delete(handlers::remove_watch_later),
        )
        .route("/activities", get(handlers::get_activities))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    match allowed_origin.and_then(|origin| HeaderValue::from_str(origin).ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}
