use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Recommendation, TradeAnalysis, TradeSetup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Planned,
    Entered,
    Exited,
    Cancelled,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Planned => "planned",
            OutcomeStatus::Entered => "entered",
            OutcomeStatus::Exited => "exited",
            OutcomeStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Manual,
    TimeBased,
}

/// How the engine's verdict held up once the trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionAccuracy {
    pub direction_correct: bool,
    pub confidence_justified: bool,
    pub risk_assessment_accurate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedMetrics {
    /// Realised move over the planned stop distance.
    pub actual_risk_reward_ratio: Decimal,
    pub holding_period_return: Decimal,
}

/// What actually happened to an analysed setup.
///
/// Starts `Planned` when the analysis is recorded, then moves to `Entered`
/// and `Exited` (or `Cancelled`) as the trader reports fills. Realised
/// figures are only filled in on exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub id: Uuid,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub setup: TradeSetup,
    pub recommendation: Recommendation,
    pub confidence: u8,
    pub status: OutcomeStatus,

    pub actual_entry: Option<Decimal>,
    pub entered_at: Option<DateTime<Utc>>,
    pub entry_notes: String,

    pub actual_exit: Option<Decimal>,
    pub exited_at: Option<DateTime<Utc>>,
    pub exit_reason: Option<ExitReason>,
    pub exit_notes: String,

    pub actual_pnl: Option<Decimal>,
    pub actual_pnl_percentage: Option<Decimal>,
    pub time_held_secs: Option<i64>,
    pub accuracy: Option<PredictionAccuracy>,
    pub metrics: Option<RealizedMetrics>,
}

impl TradeOutcome {
    pub fn planned(
        session_id: Uuid,
        setup: TradeSetup,
        analysis: &TradeAnalysis,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            created_at: now,
            setup,
            recommendation: analysis.recommendation,
            confidence: analysis.confidence,
            status: OutcomeStatus::Planned,
            actual_entry: None,
            entered_at: None,
            entry_notes: String::new(),
            actual_exit: None,
            exited_at: None,
            exit_reason: None,
            exit_notes: String::new(),
            actual_pnl: None,
            actual_pnl_percentage: None,
            time_held_secs: None,
            accuracy: None,
            metrics: None,
        }
    }

    /// Exited with a realised P&L.
    pub fn is_completed(&self) -> bool {
        self.status == OutcomeStatus::Exited && self.actual_pnl.is_some()
    }
}
