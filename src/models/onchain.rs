use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which way a large transfer moved relative to known exchange wallets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    /// Exchange → wallet (accumulation).
    In,
    /// Wallet → exchange (distribution).
    Out,
    /// Neither or both endpoints are known exchanges.
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LargeTransfer {
    pub amount: Decimal,
    pub direction: TransferDirection,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopHolder {
    pub owner_address: String,
    pub balance_formatted: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhaleActivity {
    pub whale_accumulation: bool,
    pub whale_distribution: bool,
    #[serde(default)]
    pub recent_large_transfers: Vec<LargeTransfer>,
    #[serde(default)]
    pub top_holders: Vec<TopHolder>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    pub total_volume: Decimal,
    pub transfer_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidityIndicators {
    pub exchange_inflows: Decimal,
    pub exchange_outflows: Decimal,
    /// Inflows minus outflows; positive means net movement onto exchanges.
    pub net_flow: Decimal,
}

impl LiquidityIndicators {
    pub fn new(exchange_inflows: Decimal, exchange_outflows: Decimal) -> Self {
        Self {
            exchange_inflows,
            exchange_outflows,
            net_flow: exchange_inflows.saturating_sub(exchange_outflows),
        }
    }

    /// Net movement off exchanges (bullish when positive).
    pub fn net_outflow(&self) -> Decimal {
        -self.net_flow
    }
}

/// Aggregate on-chain snapshot for a token, as handed to the recommendation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnchainInsights {
    pub whale_activity: WhaleActivity,
    pub volume_analysis: VolumeAnalysis,
    pub liquidity_indicators: LiquidityIndicators,
}

/// Human-readable on-chain notes attached to a trade analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnchainSummary {
    pub whale_activity: Vec<String>,
    pub volume_analysis: Vec<String>,
    pub liquidity_flow: Vec<String>,
}

impl OnchainSummary {
    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.whale_activity
            .iter()
            .chain(self.volume_analysis.iter())
            .chain(self.liquidity_flow.iter())
    }
}
