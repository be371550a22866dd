use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::ApiResponse;
use crate::analysis::performance::{self, OutcomeError};
use crate::analysis::{performance_metrics, PerformanceMetrics};
use crate::errors::AppError;
use crate::models::{ExitReason, OutcomeStatus, TradeOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OutcomeQuery {
    pub session_id: Option<Uuid>,
    pub status: Option<OutcomeStatus>,
    pub trading_pair: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub actual_entry: Decimal,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct ExitRequest {
    pub actual_exit: Decimal,
    pub exit_reason: ExitReason,
    #[serde(default)]
    pub notes: String,
}

pub async fn get_outcome(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TradeOutcome>>, AppError> {
    state
        .sessions
        .outcome(&id)
        .await
        .map(|o| Json(ApiResponse::ok(o)))
        .ok_or_else(|| AppError::NotFound(format!("trade outcome {id}")))
}

/// Newest first, narrowed by session, status and pair when given.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OutcomeQuery>,
) -> Result<Json<ApiResponse<Vec<TradeOutcome>>>, AppError> {
    let outcomes = scoped_outcomes(&state, query.session_id).await?;
    let filtered = outcomes
        .into_iter()
        .filter(|o| query.status.map_or(true, |s| o.status == s))
        .filter(|o| {
            query
                .trading_pair
                .as_deref()
                .map_or(true, |p| o.setup.trading_pair.eq_ignore_ascii_case(p))
        })
        .collect();
    Ok(Json(ApiResponse::ok(filtered)))
}

pub async fn record_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<ApiResponse<TradeOutcome>>, AppError> {
    let now = Utc::now();
    let outcome = apply(&state, id, |o| {
        performance::record_entry(o, req.actual_entry, req.notes, now)
    })
    .await?;

    tracing::info!(outcome_id = %id, entry = %req.actual_entry, "Trade entry recorded");
    Ok(Json(ApiResponse::ok(outcome)))
}

pub async fn record_exit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExitRequest>,
) -> Result<Json<ApiResponse<TradeOutcome>>, AppError> {
    let now = Utc::now();
    let outcome = apply(&state, id, |o| {
        performance::record_exit(o, req.actual_exit, req.exit_reason, req.notes, now)
    })
    .await?;

    counter!("trade_outcomes_closed_total").increment(1);
    Ok(Json(ApiResponse::ok(outcome)))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TradeOutcome>>, AppError> {
    let outcome = apply(&state, id, performance::cancel).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// Track record for one session, or for every live session when none is given.
pub async fn performance_summary(
    State(state): State<AppState>,
    Query(query): Query<OutcomeQuery>,
) -> Result<Json<ApiResponse<PerformanceMetrics>>, AppError> {
    let outcomes = scoped_outcomes(&state, query.session_id).await?;
    Ok(Json(ApiResponse::ok(performance_metrics(&outcomes))))
}

async fn scoped_outcomes(
    state: &AppState,
    session_id: Option<Uuid>,
) -> Result<Vec<TradeOutcome>, AppError> {
    match session_id {
        Some(id) => state
            .sessions
            .session_outcomes(&id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("session {id}"))),
        None => Ok(state.sessions.all_outcomes().await),
    }
}

async fn apply<F>(state: &AppState, id: Uuid, update: F) -> Result<TradeOutcome, AppError>
where
    F: FnOnce(&mut TradeOutcome) -> Result<(), OutcomeError>,
{
    let outcome = state
        .sessions
        .update_outcome(&id, Utc::now(), update)
        .await
        .ok_or_else(|| AppError::NotFound(format!("trade outcome {id}")))??;
    Ok(outcome)
}
