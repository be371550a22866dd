use std::time::Instant;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::analysis::summarize_onchain;
use crate::errors::AppError;
use crate::intelligence::{
    analyze_whale_behavior_with, build_onchain_insights, classify_whale_tiers_with,
    predict_from_whale_activity_with,
};
use crate::models::{
    HolderRecord, OnchainInsights, OnchainSummary, SortedHolders, TransferRecord,
    WhaleBehaviorPattern, WhalePrediction, WhaleTierAnalysis,
};
use crate::AppState;

/// Holder and transfer snapshot as fetched from the blockchain-data provider.
#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub holders: Vec<HolderRecord>,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
    /// Reject holders that are not already descending instead of sorting them.
    #[serde(default)]
    pub presorted: bool,
}

impl SnapshotRequest {
    fn sorted_holders(&mut self) -> Result<SortedHolders, AppError> {
        let holders = std::mem::take(&mut self.holders);
        if self.presorted {
            Ok(SortedHolders::from_presorted(holders)?)
        } else {
            Ok(SortedHolders::new(holders))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlockchainInsightsResponse {
    pub insights: OnchainInsights,
    pub summary: OnchainSummary,
}

#[derive(Debug, Serialize)]
pub struct WhaleIntelligenceResponse {
    pub symbol: String,
    pub tiers: WhaleTierAnalysis,
    pub behavior: WhaleBehaviorPattern,
    pub predictions: WhalePrediction,
    pub last_updated: DateTime<Utc>,
}

pub async fn blockchain_insights(
    State(state): State<AppState>,
    Json(mut req): Json<SnapshotRequest>,
) -> Result<Json<ApiResponse<BlockchainInsightsResponse>>, AppError> {
    let holders = req.sorted_holders()?;
    let insights =
        build_onchain_insights(&holders, &req.transfers, Utc::now(), &state.config.intelligence);
    let summary = summarize_onchain(&insights);

    counter!("blockchain_insights_total").increment(1);

    Ok(Json(ApiResponse::ok(BlockchainInsightsResponse {
        insights,
        summary,
    })))
}

pub async fn whale_intelligence(
    State(state): State<AppState>,
    Json(mut req): Json<SnapshotRequest>,
) -> Result<Json<ApiResponse<WhaleIntelligenceResponse>>, AppError> {
    let started = Instant::now();
    let holders = req.sorted_holders()?;
    let symbol = req.symbol.take().unwrap_or_else(|| "TOKEN".into());
    let config = &state.config.intelligence;
    let now = Utc::now();

    let tiers = classify_whale_tiers_with(&holders, &symbol, config);
    let behavior = analyze_whale_behavior_with(&req.transfers, &holders, now, config);
    let predictions = predict_from_whale_activity_with(&behavior, &tiers, config);

    counter!("whale_intelligence_total").increment(1);
    histogram!("analysis_latency_seconds").record(started.elapsed().as_secs_f64());

    tracing::info!(
        symbol = %symbol,
        holders = holders.len(),
        transfers = req.transfers.len(),
        activity = %behavior.recent_activity,
        action = ?predictions.recommendation.action,
        "Whale intelligence computed"
    );

    Ok(Json(ApiResponse::ok(WhaleIntelligenceResponse {
        symbol,
        tiers,
        behavior,
        predictions,
        last_updated: now,
    })))
}
