//! HTTP router setup.

use crate::handlers;
use crate::middleware;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    let timeout = state.config.request_timeout();

    let api = Router::new()
        .route("/api/nft/{id}/status", get(handlers::api_status))
        .route("/api/nft/{id}/mint", post(handlers::api_mint))
        .route("/api/tx/{hash}", get(handlers::tx_status))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(handlers::gallery))
        .route("/nft/{id}", get(handlers::detail))
        .route("/nft/{id}/mint", post(handlers::mint_page))
        .route("/wallet/connect", post(handlers::connect_wallet))
        .route("/wallet/disconnect", post(handlers::disconnect_wallet))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::inject_request_id))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}
