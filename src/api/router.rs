use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes, no authentication
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes, bearer token required when API_TOKEN is set
    let protected = Router::new()
        // Trade scoring
        .route("/api/risk-metrics", post(handlers::analysis::risk_metrics))
        .route("/api/analyze-trade", post(handlers::analysis::analyze_trade))
        // On-chain
        .route("/api/blockchain-insights", post(handlers::whales::blockchain_insights))
        .route("/api/whale-intelligence", post(handlers::whales::whale_intelligence))
        // Sessions
        .route("/api/sessions/:id", get(handlers::sessions::history))
        // Trade outcomes
        .route("/api/trade-outcomes", get(handlers::outcomes::list))
        .route("/api/trade-outcomes/:id", get(handlers::outcomes::get_outcome))
        .route("/api/trade-outcomes/:id/entry", post(handlers::outcomes::record_entry))
        .route("/api/trade-outcomes/:id/exit", post(handlers::outcomes::record_exit))
        .route("/api/trade-outcomes/:id/cancel", post(handlers::outcomes::cancel))
        .route("/api/performance-metrics", get(handlers::outcomes::performance_summary))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
