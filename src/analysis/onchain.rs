use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{round_dp, OnchainInsights, OnchainSummary};

const fn usd(amount: u32) -> Decimal {
    Decimal::from_parts(amount, 0, 0, false, 0)
}

const LOW_VOLUME: Decimal = usd(10_000_000);
const MODERATE_VOLUME: Decimal = usd(100_000_000);
const HIGH_VOLUME: Decimal = usd(1_000_000_000);

const SMALL_FLOW: Decimal = usd(10_000_000);
const MEDIUM_FLOW: Decimal = usd(25_000_000);
const LARGE_FLOW: Decimal = usd(50_000_000);
const HUGE_FLOW: Decimal = usd(100_000_000);

/// More than this many large transfers reads as an active trend.
const ACTIVE_LARGE_TRANSFER_COUNT: usize = 5;

const MAX_BOOST: i32 = 2;
const MIN_CONFIDENCE_DELTA: i32 = -20;
const MAX_CONFIDENCE_DELTA: i32 = 25;

/// How much the on-chain picture should move a rule-based verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OnchainAdjustment {
    /// Ladder steps, within ±2.
    pub recommendation_boost: i32,
    /// Confidence points, within [-20, 25].
    pub confidence_delta: i32,
}

pub fn calculate_onchain_adjustment(insights: &OnchainInsights) -> OnchainAdjustment {
    let mut boost = 0;
    let mut delta = 0;

    let whales = &insights.whale_activity;
    if whales.whale_accumulation {
        boost += 1;
        delta += 15;
    }
    if whales.whale_distribution {
        boost -= 1;
        delta -= 10;
    }
    if whales.recent_large_transfers.len() > ACTIVE_LARGE_TRANSFER_COUNT {
        delta += 10;
    }

    let net_outflow = insights.liquidity_indicators.net_outflow();
    if net_outflow > HUGE_FLOW {
        boost += 2;
        delta += 20;
    } else if net_outflow > MEDIUM_FLOW {
        boost += 1;
        delta += 10;
    } else if net_outflow < -HUGE_FLOW {
        // Heavy inflow is a high-certainty bearish read
        boost -= 2;
        delta += 15;
    } else if net_outflow < -MEDIUM_FLOW {
        boost -= 1;
        delta += 10;
    }

    let volume = insights.volume_analysis.total_volume;
    if volume > HIGH_VOLUME {
        delta += 10;
    } else if volume < LOW_VOLUME {
        delta -= 5;
    }

    OnchainAdjustment {
        recommendation_boost: boost.clamp(-MAX_BOOST, MAX_BOOST),
        confidence_delta: delta.clamp(MIN_CONFIDENCE_DELTA, MAX_CONFIDENCE_DELTA),
    }
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyUnit {
    K,
    M,
    B,
}

impl CurrencyUnit {
    fn divisor(self) -> Decimal {
        match self {
            CurrencyUnit::K => usd(1_000),
            CurrencyUnit::M => usd(1_000_000),
            CurrencyUnit::B => usd(1_000_000_000),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            CurrencyUnit::K => "K",
            CurrencyUnit::M => "M",
            CurrencyUnit::B => "B",
        }
    }
}

/// `$12.3M`-style figure. Thousands have no decimals, millions and billions one.
pub fn format_currency(amount: Decimal, unit: CurrencyUnit) -> String {
    let decimals: usize = if unit == CurrencyUnit::K { 0 } else { 1 };
    let scaled = round_dp(amount / unit.divisor(), decimals as u32);
    format!("${:.*}{}", decimals, scaled, unit.suffix())
}

/// Turn the on-chain aggregate into key-point lines grouped by theme.
pub fn summarize_onchain(insights: &OnchainInsights) -> OnchainSummary {
    let mut summary = OnchainSummary::default();

    let whales = &insights.whale_activity;
    if whales.whale_accumulation {
        summary
            .whale_activity
            .push("Whale accumulation detected - large holders increasing positions".into());
    }
    if whales.whale_distribution {
        summary
            .whale_activity
            .push("Whale distribution detected - large holders reducing positions".into());
    }
    if !whales.recent_large_transfers.is_empty() {
        summary.whale_activity.push(format!(
            "{} large transfers (>$100k) in last 24h",
            whales.recent_large_transfers.len()
        ));
    }
    if let Some(top) = whales.top_holders.first() {
        if top.balance_formatted > Decimal::ZERO {
            summary.whale_activity.push(format!(
                "Top holder controls {} in tokens",
                format_currency(top.balance_formatted, CurrencyUnit::M)
            ));
        }
    }

    let volume = &insights.volume_analysis;
    let total = volume.total_volume;
    let volume_line = if total > HIGH_VOLUME {
        format!("High volume: {} in 24h activity", format_currency(total, CurrencyUnit::B))
    } else if total > MODERATE_VOLUME {
        format!("Moderate volume: {} in 24h activity", format_currency(total, CurrencyUnit::M))
    } else {
        format!("Low volume: {} in 24h activity", format_currency(total, CurrencyUnit::M))
    };
    summary.volume_analysis.push(volume_line);

    if volume.transfer_count > 0 {
        let average = total / Decimal::from(volume.transfer_count);
        summary.volume_analysis.push(format!(
            "{} transfers with avg size {}",
            volume.transfer_count,
            format_currency(average, CurrencyUnit::K)
        ));
    }

    let flows = &insights.liquidity_indicators;
    let net_outflow = flows.net_outflow();
    let flow_line = if net_outflow > LARGE_FLOW {
        format!(
            "Strong exchange outflow: {} (bullish signal)",
            format_currency(net_outflow, CurrencyUnit::M)
        )
    } else if net_outflow > SMALL_FLOW {
        format!(
            "Exchange outflow: {} (positive signal)",
            format_currency(net_outflow, CurrencyUnit::M)
        )
    } else if net_outflow < -LARGE_FLOW {
        format!(
            "Heavy exchange inflow: {} (bearish signal)",
            format_currency(net_outflow.abs(), CurrencyUnit::M)
        )
    } else if net_outflow < -SMALL_FLOW {
        format!(
            "Exchange inflow: {} (negative signal)",
            format_currency(net_outflow.abs(), CurrencyUnit::M)
        )
    } else {
        "Balanced exchange flows: minimal net movement".to_string()
    };
    summary.liquidity_flow.push(flow_line);

    if flows.exchange_outflows > Decimal::ZERO {
        summary.liquidity_flow.push(format!(
            "Exchange outflows: {}",
            format_currency(flows.exchange_outflows, CurrencyUnit::M)
        ));
    }
    if flows.exchange_inflows > Decimal::ZERO {
        summary.liquidity_flow.push(format!(
            "Exchange inflows: {}",
            format_currency(flows.exchange_inflows, CurrencyUnit::M)
        ));
    }

    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
