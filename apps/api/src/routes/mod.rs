pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Relay: the original serverless contract, no auth
        .route(
            "/functions/v1/analyze-coursework",
            post(handlers::handle_analyze_coursework).options(handlers::handle_preflight),
        )
        // Analysis API (signed-in users)
        .route("/api/v1/analyses", post(handlers::handle_create_analysis))
        .route("/api/v1/profile", get(handlers::handle_get_profile))
        .route(
            "/api/v1/profiles/:id",
            get(handlers::handle_get_shared_profile),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
}
