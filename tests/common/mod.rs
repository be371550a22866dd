use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use tradelens::models::{
    HolderRecord, LiquidityIndicators, OnchainInsights, SortedHolders, TradeSetup,
    TransferRecord, VolumeAnalysis, WhaleActivity,
};

/// 50+ words, seven vocabulary terms.
#[allow(dead_code)]
pub const DETAILED_REASONING: &str = "Price is bouncing off a major support zone with RSI \
    oversold on the daily chart and bullish divergence on the MACD histogram. Volume expanded \
    on the last green candle, confirming buyers stepping in at this level. The broader trend \
    remains intact above the rising channel floor and momentum indicators are curling up from \
    their lows after a long consolidation.";

#[allow(dead_code)]
pub const BINANCE: &str = "0x3f5ce5fbfe3e9af3971dd833d26ba9b5c936f0be";

/// Long setup with detailed reasoning and no leverage.
#[allow(dead_code)]
pub fn trade_setup(entry: i64, take_profit: i64, stop_loss: i64) -> TradeSetup {
    TradeSetup {
        trading_pair: "ETH/USDT".into(),
        entry_price: Decimal::from(entry),
        entry_reasoning: DETAILED_REASONING.into(),
        take_profit_price: Decimal::from(take_profit),
        take_profit_reasoning: "Previous resistance level from the March highs".into(),
        stop_loss_price: Decimal::from(stop_loss),
        stop_loss_reasoning: "Below the support shelf and recent swing low".into(),
        position_size: Decimal::from(1_000),
        time_frame: "day-trading".into(),
        leverage: Decimal::ONE,
    }
}

#[allow(dead_code)]
pub fn holders(rows: &[(&str, i64)]) -> SortedHolders {
    SortedHolders::new(
        rows.iter()
            .map(|(address, balance)| HolderRecord::new(*address, Decimal::from(*balance)))
            .collect(),
    )
}

#[allow(dead_code)]
pub fn transfer(from: &str, to: &str, value: i64, at: DateTime<Utc>) -> TransferRecord {
    TransferRecord {
        from: from.into(),
        to: to.into(),
        value: Decimal::from(value),
        value_formatted: None,
        timestamp: at,
    }
}

#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[allow(dead_code)]
pub fn minutes_before(now: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    now - Duration::minutes(minutes)
}

/// On-chain aggregate with the given whale flags and exchange flows (USD).
#[allow(dead_code)]
pub fn onchain(
    accumulation: bool,
    distribution: bool,
    inflows: i64,
    outflows: i64,
    volume: i64,
) -> OnchainInsights {
    OnchainInsights {
        whale_activity: WhaleActivity {
            whale_accumulation: accumulation,
            whale_distribution: distribution,
            recent_large_transfers: vec![],
            top_holders: vec![],
        },
        volume_analysis: VolumeAnalysis {
            total_volume: Decimal::from(volume),
            transfer_count: 1_000,
        },
        liquidity_indicators: LiquidityIndicators::new(
            Decimal::from(inflows),
            Decimal::from(outflows),
        ),
    }
}
