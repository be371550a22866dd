use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::RecentActivity;

/// Tunable heuristics for the whale pipeline. The defaults are hand-picked,
/// not fitted; swap in calibrated values here rather than in the algorithms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntelligenceConfig {
    pub tiers: TierThresholds,
    pub concentration: ConcentrationThresholds,
    pub behavior: BehaviorConfig,
    pub historical_accuracy: HistoricalAccuracy,
    pub hold_time: HoldTimeBuckets,
    pub prediction: PredictionThresholds,
    pub flows: FlowConfig,
}

/// A holder lands in the first tier whose percentage OR balance bar it clears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub mega_pct: Decimal,
    pub mega_balance: Decimal,
    pub whale_pct: Decimal,
    pub whale_balance: Decimal,
    pub dolphin_pct: Decimal,
    pub dolphin_balance: Decimal,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            mega_pct: Decimal::ONE,                // 1%
            mega_balance: Decimal::from(1_000),
            whale_pct: Decimal::new(1, 1),         // 0.1%
            whale_balance: Decimal::from(100),
            dolphin_pct: Decimal::new(1, 2),       // 0.01%
            dolphin_balance: Decimal::from(10),
        }
    }
}

/// Top-10 share (%) above which concentration risk is Medium / High.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcentrationThresholds {
    pub medium_top10_pct: Decimal,
    pub high_top10_pct: Decimal,
}

impl Default for ConcentrationThresholds {
    fn default() -> Self {
        Self {
            medium_top10_pct: Decimal::from(40),
            high_top10_pct: Decimal::from(70),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Only transfers this recent are considered.
    pub window_hours: i64,
    /// Number of largest holders treated as whales.
    pub whale_set_size: usize,
    pub coordination_window_secs: i64,
    pub coordination_min_transfers: usize,
    /// inflow / outflow above this reads as accumulation.
    pub accumulation_ratio: Decimal,
    /// inflow / outflow below this reads as distribution.
    pub distribution_ratio: Decimal,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            window_hours: 48,
            whale_set_size: 50,
            coordination_window_secs: 3_600,
            coordination_min_transfers: 3,
            accumulation_ratio: Decimal::from(2),
            distribution_ratio: Decimal::new(5, 1),
        }
    }
}

/// Static per-label accuracy figures (percent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalAccuracy {
    pub accumulating: u8,
    pub distributing: u8,
    pub mixed: u8,
    pub holding: u8,
}

impl Default for HistoricalAccuracy {
    fn default() -> Self {
        Self {
            accumulating: 78,
            distributing: 72,
            mixed: 65,
            holding: 70,
        }
    }
}

impl HistoricalAccuracy {
    pub fn for_activity(&self, activity: RecentActivity) -> u8 {
        match activity {
            RecentActivity::Accumulating => self.accumulating,
            RecentActivity::Distributing => self.distributing,
            RecentActivity::Mixed => self.mixed,
            RecentActivity::Holding => self.holding,
        }
    }
}

/// Coarse average-hold-time label per activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldTimeBuckets {
    pub accumulating: String,
    pub distributing: String,
    pub mixed: String,
    pub holding: String,
}

impl Default for HoldTimeBuckets {
    fn default() -> Self {
        Self {
            accumulating: "30+ days".into(),
            distributing: "< 7 days".into(),
            mixed: "7-30 days".into(),
            holding: "90+ days".into(),
        }
    }
}

impl HoldTimeBuckets {
    pub fn for_activity(&self, activity: RecentActivity) -> &str {
        match activity {
            RecentActivity::Accumulating => &self.accumulating,
            RecentActivity::Distributing => &self.distributing,
            RecentActivity::Mixed => &self.mixed,
            RecentActivity::Holding => &self.holding,
        }
    }
}

/// Cut-offs for turning behaviour + tiers into a directional call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionThresholds {
    /// Buy or sell pressure (%) above which the move is directional.
    pub pressure_pct: Decimal,
    pub coordination_bonus: u8,
    pub high_magnitude_bonus: u8,
    pub max_confidence: u8,
    /// BUY / SELL only above this confidence.
    pub act_confidence: u8,
    /// WAIT below this confidence.
    pub wait_confidence: u8,
    /// Low risk above this confidence when nothing else flags it.
    pub low_risk_confidence: u8,
}

impl Default for PredictionThresholds {
    fn default() -> Self {
        Self {
            pressure_pct: Decimal::from(70),
            coordination_bonus: 20,
            high_magnitude_bonus: 15,
            max_confidence: 95,
            act_confidence: 70,
            wait_confidence: 50,
            low_risk_confidence: 80,
        }
    }
}

/// Thresholds used when rolling raw transfers up into an on-chain aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Holder amount (tokens) above which a holder is reported as a top whale.
    pub whale_holder_min: Decimal,
    /// Transfer amount (tokens) above which a transfer counts as large.
    pub large_transfer_min: Decimal,
    pub large_transfer_sample: usize,
    pub reported_large_transfers: usize,
    pub reported_top_holders: usize,
    pub volume_window_hours: i64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            whale_holder_min: Decimal::from(1_000_000),
            large_transfer_min: Decimal::from(100_000),
            large_transfer_sample: 20,
            reported_large_transfers: 5,
            reported_top_holders: 10,
            volume_window_hours: 24,
        }
    }
}
