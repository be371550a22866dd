use std::time::Instant;

use chrono::Utc;

use axum::extract::State;
use axum::Json;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiResponse;
use crate::analysis::{calculate_risk_metrics, generate_recommendation, validate_trade_setup};
use crate::errors::AppError;
use crate::models::{OnchainInsights, RiskMetrics, TradeAnalysis, TradeSetup};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeTradeRequest {
    pub trade_setup: TradeSetup,
    #[serde(default)]
    pub onchain: Option<OnchainInsights>,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeTradeResponse {
    pub session_id: Uuid,
    /// Planned outcome to report entry and exit fills against.
    pub outcome_id: Uuid,
    pub analysis: TradeAnalysis,
}

pub async fn risk_metrics(
    Json(setup): Json<TradeSetup>,
) -> Result<Json<ApiResponse<RiskMetrics>>, AppError> {
    if let Err(e) = validate_trade_setup(&setup) {
        counter!("invalid_trade_setups_total").increment(1);
        return Err(e.into());
    }

    counter!("risk_metrics_total").increment(1);
    Ok(Json(ApiResponse::ok(calculate_risk_metrics(&setup))))
}

pub async fn analyze_trade(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeTradeRequest>,
) -> Result<Json<ApiResponse<AnalyzeTradeResponse>>, AppError> {
    let started = Instant::now();
    let setup = req.trade_setup;

    if let Err(e) = validate_trade_setup(&setup) {
        counter!("invalid_trade_setups_total").increment(1);
        tracing::info!(pair = %setup.trading_pair, error = %e, "Rejected trade setup");
        return Err(e.into());
    }

    let metrics = calculate_risk_metrics(&setup);
    let analysis = generate_recommendation(&metrics, &setup, req.onchain.as_ref());

    let now = Utc::now();
    let session_id = state
        .sessions
        .record_at(req.session_id, setup.clone(), analysis.clone(), now)
        .await;
    let outcome = state
        .sessions
        .track_outcome(session_id, setup, &analysis, now)
        .await;

    counter!("trade_analyses_total").increment(1);
    histogram!("analysis_latency_seconds").record(started.elapsed().as_secs_f64());

    tracing::info!(
        session_id = %session_id,
        outcome_id = %outcome.id,
        pair = %analysis.trading_pair,
        recommendation = %analysis.recommendation,
        confidence = analysis.confidence,
        "Trade analysed"
    );

    Ok(Json(ApiResponse::ok(AnalyzeTradeResponse {
        session_id,
        outcome_id: outcome.id,
        analysis,
    })))
}
