use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::OnchainSummary;

/// A trader's declared long setup, already parsed into numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSetup {
    pub trading_pair: String,
    pub entry_price: Decimal,
    #[serde(default)]
    pub entry_reasoning: String,
    pub take_profit_price: Decimal,
    #[serde(default)]
    pub take_profit_reasoning: String,
    pub stop_loss_price: Decimal,
    #[serde(default)]
    pub stop_loss_reasoning: String,
    pub position_size: Decimal,
    pub time_frame: String,
    #[serde(default = "default_leverage")]
    pub leverage: Decimal,
}

fn default_leverage() -> Decimal {
    Decimal::ONE
}

impl TradeSetup {
    /// The three rationale fields joined with single spaces.
    pub fn combined_reasoning(&self) -> String {
        [
            self.entry_reasoning.as_str(),
            self.take_profit_reasoning.as_str(),
            self.stop_loss_reasoning.as_str(),
        ]
        .join(" ")
    }
}

/// Derived risk figures for a setup. All numbers rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub risk_reward_ratio: Decimal,
    pub potential_profit: Decimal,
    pub potential_loss: Decimal,
    pub profit_percentage: Decimal,
    pub loss_percentage: Decimal,
    pub is_valid_setup: bool,
    pub warnings: Vec<String>,
}

/// Verdict ladder, ordered from most bearish to most bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongAvoid,
    Avoid,
    Hold,
    Buy,
    StrongBuy,
}

impl Recommendation {
    const LADDER: [Recommendation; 5] = [
        Recommendation::StrongAvoid,
        Recommendation::Avoid,
        Recommendation::Hold,
        Recommendation::Buy,
        Recommendation::StrongBuy,
    ];

    fn rank(self) -> i32 {
        match self {
            Recommendation::StrongAvoid => 0,
            Recommendation::Avoid => 1,
            Recommendation::Hold => 2,
            Recommendation::Buy => 3,
            Recommendation::StrongBuy => 4,
        }
    }

    /// Move `steps` rungs up (positive) or down (negative), saturating at both ends.
    pub fn step(self, steps: i32) -> Self {
        let idx = (self.rank() + steps).clamp(0, Self::LADDER.len() as i32 - 1);
        Self::LADDER[idx as usize]
    }

    /// One rung towards `StrongAvoid`. Never upgrades.
    pub fn downgrade(self) -> Self {
        self.step(-1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongAvoid => "STRONG_AVOID",
            Recommendation::Avoid => "AVOID",
            Recommendation::Hold => "HOLD",
            Recommendation::Buy => "BUY",
            Recommendation::StrongBuy => "STRONG_BUY",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the recommendation engine for one evaluation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeAnalysis {
    pub trading_pair: String,
    pub risk_metrics: RiskMetrics,
    pub recommendation: Recommendation,
    pub confidence: u8,
    pub analysis: String,
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onchain_summary: Option<OnchainSummary>,
}

/// Free-text position size as typed into a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PositionSize {
    Percentage(Decimal),
    Dollar(Decimal),
    Invalid,
}
