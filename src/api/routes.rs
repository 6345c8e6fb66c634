//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/wallet/balance", get(balance_handler))
        // Catalog and jackpots
        .route("/games", get(list_games_handler))
        .route("/games/jackpots", get(jackpots_handler))
        .route("/games/jackpots/:game_type", get(jackpot_handler))
        // Session lifecycle
        .route("/games/:game_type/start", post(start_handler))
        .route("/games/:game_type/action", post(action_handler))
        .route("/games/:game_type/cashout", post(cashout_handler))
        .route("/games/:game_type/history", get(history_handler))
        .route(
            "/games/:game_type/sessions/:session_id",
            get(session_handler),
        )
        .with_state(state)
}
