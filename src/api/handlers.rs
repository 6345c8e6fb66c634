//! Request Handlers
//!
//! Thin adapters from HTTP to `SessionManager`.

use super::{
    errors::ApiError,
    middleware::{PlayerId, RequestId},
    models::*,
};
use crate::games::history::MAX_PAGE_SIZE;
use crate::games::jackpot::JackpotPool;
use crate::games::manager::{ActionOutcome, CashoutOutcome, SessionManager, StartOutcome};
use crate::games::session::SessionSnapshot;
use crate::games::catalog::GameSummary;
use crate::games::types::{GameType, PlayerAction};
use crate::metrics::GameMetrics;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub manager: Arc<SessionManager>,
    pub metrics: Arc<GameMetrics>,
    pub version: String,
}

fn parse_game(request_id: &RequestId, raw: &str) -> Result<GameType, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::game(request_id.0.clone(), e))
}

fn body<T>(request_id: &RequestId, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::bad_request(request_id.0.clone(), e.body_text()))
}

/// Health check handler
/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        sessions: state.manager.active_sessions(),
    })
}

/// Prometheus scrape endpoint
/// GET /metrics
pub async fn metrics_handler(
    request_id: RequestId,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let text = state
        .metrics
        .render()
        .map_err(|e| ApiError::internal_error(request_id.0.clone(), e.to_string()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    )
        .into_response())
}

/// GET /wallet/balance
pub async fn balance_handler(
    request_id: RequestId,
    PlayerId(user_id): PlayerId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .manager
        .balance(&user_id)
        .await
        .map_err(|e| ApiError::game(request_id.0.clone(), e))?;
    Ok(Json(BalanceResponse { user_id, balance }))
}

/// GET /games
pub async fn list_games_handler(State(state): State<Arc<AppState>>) -> Json<Vec<GameSummary>> {
    Json(state.manager.list_games())
}

/// GET /games/jackpots
pub async fn jackpots_handler(
    request_id: RequestId,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<JackpotPool>>, ApiError> {
    state
        .manager
        .jackpots()
        .map(Json)
        .map_err(|e| ApiError::game(request_id.0.clone(), e))
}

/// GET /games/jackpots/{type}
pub async fn jackpot_handler(
    request_id: RequestId,
    Path(game_type): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<JackpotPool>, ApiError> {
    let game_type = parse_game(&request_id, &game_type)?;
    state
        .manager
        .jackpot(game_type)
        .map(Json)
        .map_err(|e| ApiError::game(request_id.0.clone(), e))
}

/// POST /games/{type}/start
pub async fn start_handler(
    request_id: RequestId,
    PlayerId(user_id): PlayerId,
    Path(game_type): Path<String>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<StartOutcome>, ApiError> {
    let game_type = parse_game(&request_id, &game_type)?;
    let request = body(&request_id, payload)?;
    state
        .manager
        .start(&user_id, game_type, request.bet_amount, request.room_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::game(request_id.0.clone(), e))
}

/// POST /games/{type}/action
pub async fn action_handler(
    request_id: RequestId,
    PlayerId(user_id): PlayerId,
    Path(game_type): Path<String>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<ActionOutcome>, ApiError> {
    let game_type = parse_game(&request_id, &game_type)?;
    let request = body(&request_id, payload)?;
    state
        .manager
        .action(
            &user_id,
            game_type,
            &request.session_id,
            PlayerAction::new(request.action, request.data),
        )
        .await
        .map(Json)
        .map_err(|e| ApiError::game(request_id.0.clone(), e))
}

/// POST /games/{type}/cashout
pub async fn cashout_handler(
    request_id: RequestId,
    PlayerId(user_id): PlayerId,
    Path(game_type): Path<String>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CashoutRequest>, JsonRejection>,
) -> Result<Json<CashoutOutcome>, ApiError> {
    let game_type = parse_game(&request_id, &game_type)?;
    let request = body(&request_id, payload)?;
    state
        .manager
        .cashout(&user_id, game_type, &request.session_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::game(request_id.0.clone(), e))
}

/// GET /games/{type}/history?offset={n}&limit={n}
pub async fn history_handler(
    request_id: RequestId,
    PlayerId(user_id): PlayerId,
    Path(game_type): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let game_type = parse_game(&request_id, &game_type)?;
    let limit = query.limit.min(MAX_PAGE_SIZE);
    Ok(Json(HistoryResponse {
        items: state
            .manager
            .history(&user_id, game_type, query.offset, limit),
        offset: query.offset,
        limit,
    }))
}

/// GET /games/{type}/sessions/{id}
pub async fn session_handler(
    request_id: RequestId,
    PlayerId(user_id): PlayerId,
    Path((game_type, session_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let game_type = parse_game(&request_id, &game_type)?;
    let snapshot = state
        .manager
        .session(&user_id, &session_id)
        .await
        .map_err(|e| ApiError::game(request_id.0.clone(), e))?;
    if snapshot.game_type != game_type {
        return Err(ApiError::game(
            request_id.0.clone(),
            crate::errors::GameError::GameTypeMismatch {
                session_id,
                requested: game_type,
                actual: snapshot.game_type,
            },
        ));
    }
    Ok(Json(snapshot))
}
