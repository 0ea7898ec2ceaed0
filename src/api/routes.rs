use axum::{
    http::{header, Method},
    routing::post,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};
use crate::services::health;

pub fn create_router(state: AppState, claim_path: &str) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let health = state.health.clone();

    Router::new()
        // Claim endpoint
        .route(
            claim_path,
            post(handlers::claim)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        // Health and metrics endpoints
        .merge(health::router(health))
        .layer(cors)
}
