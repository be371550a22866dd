use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::intelligence::IntelligenceError;

// ---------------------------------------------------------------------------
// Raw snapshot records
// ---------------------------------------------------------------------------

/// Holder row as returned by the blockchain-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderRecord {
    #[serde(alias = "owner_address")]
    pub address: String,
    pub balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_formatted: Option<Decimal>,
}

impl HolderRecord {
    pub fn new(address: impl Into<String>, balance: Decimal) -> Self {
        Self {
            address: address.into(),
            balance,
            balance_formatted: None,
        }
    }

    /// Balance in token units: the formatted figure when the provider sent one.
    pub fn amount(&self) -> Decimal {
        self.balance_formatted.unwrap_or(self.balance)
    }
}

/// Transfer row as returned by the blockchain-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from: String,
    pub to: String,
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_formatted: Option<Decimal>,
    #[serde(with = "chrono::serde::ts_seconds", alias = "block_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl TransferRecord {
    pub fn amount(&self) -> Decimal {
        self.value_formatted.unwrap_or(self.value)
    }
}

/// Holder snapshot ordered by descending balance.
///
/// Top-N concentration and the whale set both read the first N entries, so the
/// ordering is carried in the type instead of being a caller convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SortedHolders(Vec<HolderRecord>);

impl SortedHolders {
    /// Stable-sort `holders` by descending amount.
    pub fn new(mut holders: Vec<HolderRecord>) -> Self {
        holders.sort_by(|a, b| b.amount().cmp(&a.amount()));
        Self(holders)
    }

    /// Accept a list the caller claims is already descending; reject it otherwise.
    pub fn from_presorted(holders: Vec<HolderRecord>) -> Result<Self, IntelligenceError> {
        if let Some(pos) = holders
            .windows(2)
            .position(|w| w[0].amount() < w[1].amount())
        {
            return Err(IntelligenceError::UnsortedHolders { index: pos + 1 });
        }
        Ok(Self(holders))
    }

    pub fn as_slice(&self) -> &[HolderRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The largest `n` holders.
    pub fn top(&self, n: usize) -> &[HolderRecord] {
        &self.0[..n.min(self.0.len())]
    }
}

impl From<Vec<HolderRecord>> for SortedHolders {
    fn from(holders: Vec<HolderRecord>) -> Self {
        Self::new(holders)
    }
}

impl<'de> Deserialize<'de> for SortedHolders {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<HolderRecord>::deserialize(deserializer).map(SortedHolders::new)
    }
}

// ---------------------------------------------------------------------------
// Tier classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhaleTier {
    Mega,
    Whale,
    Dolphin,
    Fish,
}

impl WhaleTier {
    pub fn label(&self) -> &'static str {
        match self {
            WhaleTier::Mega => "Mega Whale",
            WhaleTier::Whale => "Whale",
            WhaleTier::Dolphin => "Dolphin",
            WhaleTier::Fish => "Fish",
        }
    }
}

impl fmt::Display for WhaleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleHolder {
    pub address: String,
    pub balance: Decimal,
    pub balance_formatted: String,
    pub percentage: Decimal,
    pub tier: WhaleTier,
    pub is_exchange: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationStats {
    pub top10_percentage: Decimal,
    pub top50_percentage: Decimal,
    pub gini_coefficient: Decimal,
    pub concentration_risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleTierAnalysis {
    pub symbol: String,
    pub mega_whales: Vec<WhaleHolder>,
    pub whales: Vec<WhaleHolder>,
    pub dolphins: Vec<WhaleHolder>,
    pub total_holders: usize,
    pub concentration: ConcentrationStats,
}

impl WhaleTierAnalysis {
    /// Mega whales plus whales.
    pub fn whale_count(&self) -> usize {
        self.mega_whales.len() + self.whales.len()
    }
}

// ---------------------------------------------------------------------------
// Behaviour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecentActivity {
    Accumulating,
    Distributing,
    Holding,
    Mixed,
}

impl fmt::Display for RecentActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecentActivity::Accumulating => "accumulating",
            RecentActivity::Distributing => "distributing",
            RecentActivity::Holding => "holding",
            RecentActivity::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

/// Buy/sell/hodl percentages, each within 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureMetrics {
    pub buy_pressure: Decimal,
    pub sell_pressure: Decimal,
    pub hodl_strength: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleBehaviorPattern {
    pub recent_activity: RecentActivity,
    pub coordinated_movements: usize,
    pub average_hold_time: String,
    pub historical_accuracy: u8,
    /// 0.0–1.0
    pub confidence_score: Decimal,
    pub patterns: PressureMetrics,
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactMagnitude {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactTimeframe {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "7d")]
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WhaleAction {
    Buy,
    Sell,
    Hold,
    Wait,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceImpact {
    pub direction: PriceDirection,
    pub magnitude: ImpactMagnitude,
    pub timeframe: ImpactTimeframe,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecommendation {
    pub action: WhaleAction,
    pub reasoning: Vec<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhalePrediction {
    pub price_impact: PriceImpact,
    pub recommendation: ActionRecommendation,
}
