use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::exchanges::is_exchange_address;
use super::thresholds::IntelligenceConfig;
use crate::models::{
    LargeTransfer, LiquidityIndicators, OnchainInsights, SortedHolders, TopHolder,
    TransferDirection, TransferRecord, VolumeAnalysis, WhaleActivity,
};

/// Roll a raw holder/transfer snapshot up into the aggregate the recommendation
/// engine consumes.
pub fn build_onchain_insights(
    holders: &SortedHolders,
    transfers: &[TransferRecord],
    now: DateTime<Utc>,
    config: &IntelligenceConfig,
) -> OnchainInsights {
    let cfg = &config.flows;

    let top_holders: Vec<TopHolder> = holders
        .as_slice()
        .iter()
        .filter(|h| h.amount() > cfg.whale_holder_min)
        .take(cfg.reported_top_holders)
        .map(|h| TopHolder {
            owner_address: h.address.clone(),
            balance_formatted: h.amount(),
        })
        .collect();

    let mut newest_first: Vec<&TransferRecord> = transfers.iter().collect();
    newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let large: Vec<LargeTransfer> = newest_first
        .iter()
        .filter(|t| t.amount() > cfg.large_transfer_min)
        .take(cfg.large_transfer_sample)
        .map(|t| LargeTransfer {
            amount: t.amount(),
            direction: transfer_direction(&t.from, &t.to),
            timestamp: t.timestamp,
        })
        .collect();

    let ins = large
        .iter()
        .filter(|t| t.direction == TransferDirection::In)
        .count();
    let outs = large
        .iter()
        .filter(|t| t.direction == TransferDirection::Out)
        .count();

    // Raw base-unit volumes can exceed the Decimal range; totals saturate.
    let cutoff = Duration::try_hours(cfg.volume_window_hours)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut total_volume = Decimal::ZERO;
    let mut transfer_count = 0u64;
    let mut exchange_inflows = Decimal::ZERO;
    let mut exchange_outflows = Decimal::ZERO;
    for t in newest_first.iter().filter(|t| t.timestamp >= cutoff) {
        let amount = t.amount();
        total_volume = total_volume.saturating_add(amount);
        transfer_count += 1;
        if is_exchange_address(&t.to) {
            exchange_inflows = exchange_inflows.saturating_add(amount);
        }
        if is_exchange_address(&t.from) {
            exchange_outflows = exchange_outflows.saturating_add(amount);
        }
    }

    tracing::debug!(
        holders = holders.len(),
        transfers = transfers.len(),
        large = large.len(),
        ins,
        outs,
        volume = %total_volume,
        "On-chain insights built"
    );

    OnchainInsights {
        whale_activity: WhaleActivity {
            whale_accumulation: ins > outs,
            whale_distribution: outs > ins,
            recent_large_transfers: large
                .into_iter()
                .take(cfg.reported_large_transfers)
                .collect(),
            top_holders,
        },
        volume_analysis: VolumeAnalysis {
            total_volume,
            transfer_count,
        },
        liquidity_indicators: LiquidityIndicators::new(exchange_inflows, exchange_outflows),
    }
}

/// Exchange to wallet is a withdrawal (`In`), wallet to exchange a deposit (`Out`).
/// Anything else is left `Unknown`.
pub fn transfer_direction(from: &str, to: &str) -> TransferDirection {
    match (is_exchange_address(from), is_exchange_address(to)) {
        (true, false) => TransferDirection::In,
        (false, true) => TransferDirection::Out,
        _ => TransferDirection::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HolderRecord;

    const BINANCE: &str = "0x3f5ce5fbfe3e9af3971dd833d26ba9b5c936f0be";
    const COINBASE: &str = "0x71660c4005ba85c37ccec55d0c4493e66fe775d3";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn transfer(from: &str, to: &str, value: i64, hours_ago: i64) -> TransferRecord {
        TransferRecord {
            from: from.into(),
            to: to.into(),
            value: Decimal::from(value),
            value_formatted: None,
            timestamp: now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn test_direction_uses_exchange_set() {
        assert_eq!(transfer_direction(BINANCE, "0xwallet"), TransferDirection::In);
        assert_eq!(transfer_direction("0xwallet", COINBASE), TransferDirection::Out);
        assert_eq!(transfer_direction("0xa", "0xb"), TransferDirection::Unknown);
        assert_eq!(transfer_direction(BINANCE, COINBASE), TransferDirection::Unknown);
    }

    #[test]
    fn test_top_holders_filtered_and_capped() {
        let mut rows: Vec<HolderRecord> = (0..15)
            .map(|i| HolderRecord::new(format!("0x{i}"), Decimal::from(2_000_000 + i)))
            .collect();
        rows.push(HolderRecord::new("0xsmall", Decimal::from(999_999)));
        let insights = build_onchain_insights(
            &SortedHolders::new(rows),
            &[],
            now(),
            &IntelligenceConfig::default(),
        );

        let top = &insights.whale_activity.top_holders;
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].owner_address, "0x14");
        assert!(top.iter().all(|h| h.owner_address != "0xsmall"));
    }

    #[test]
    fn test_accumulation_from_exchange_withdrawals() {
        let transfers = vec![
            transfer(BINANCE, "0xw1", 500_000, 1),
            transfer(COINBASE, "0xw2", 200_000, 2),
            transfer("0xw3", BINANCE, 300_000, 3),
            transfer("0xa", "0xb", 900_000, 4),
            transfer("0xa", "0xb", 50_000, 5),
        ];
        let insights = build_onchain_insights(
            &SortedHolders::default(),
            &transfers,
            now(),
            &IntelligenceConfig::default(),
        );

        let whales = &insights.whale_activity;
        assert!(whales.whale_accumulation);
        assert!(!whales.whale_distribution);
        assert_eq!(whales.recent_large_transfers.len(), 4);
        assert_eq!(whales.recent_large_transfers[0].amount, Decimal::from(500_000));
        assert_eq!(
            whales.recent_large_transfers[3].direction,
            TransferDirection::Unknown
        );

        assert_eq!(insights.volume_analysis.total_volume, Decimal::from(1_950_000));
        assert_eq!(insights.volume_analysis.transfer_count, 5);

        let flows = &insights.liquidity_indicators;
        assert_eq!(flows.exchange_inflows, Decimal::from(300_000));
        assert_eq!(flows.exchange_outflows, Decimal::from(700_000));
        assert_eq!(flows.net_outflow(), Decimal::from(400_000));
    }

    #[test]
    fn test_equal_in_and_out_flags_neither() {
        let transfers = vec![
            transfer(BINANCE, "0xw1", 500_000, 1),
            transfer("0xw2", BINANCE, 500_000, 2),
        ];
        let insights = build_onchain_insights(
            &SortedHolders::default(),
            &transfers,
            now(),
            &IntelligenceConfig::default(),
        );
        assert!(!insights.whale_activity.whale_accumulation);
        assert!(!insights.whale_activity.whale_distribution);
    }

    #[test]
    fn test_reports_five_most_recent_large_transfers() {
        let transfers: Vec<TransferRecord> = (0..8)
            .map(|h| transfer("0xw", BINANCE, 200_000 + h, h))
            .collect();
        let insights = build_onchain_insights(
            &SortedHolders::default(),
            &transfers,
            now(),
            &IntelligenceConfig::default(),
        );
        let reported = &insights.whale_activity.recent_large_transfers;
        assert_eq!(reported.len(), 5);
        assert_eq!(reported[0].timestamp, now());
        assert!(insights.whale_activity.whale_distribution);
    }

    #[test]
    fn test_volume_window_excludes_old_transfers() {
        let transfers = vec![
            transfer("0xa", "0xb", 1_000, 1),
            transfer("0xa", BINANCE, 5_000, 30),
        ];
        let insights = build_onchain_insights(
            &SortedHolders::default(),
            &transfers,
            now(),
            &IntelligenceConfig::default(),
        );
        assert_eq!(insights.volume_analysis.total_volume, Decimal::from(1_000));
        assert_eq!(insights.volume_analysis.transfer_count, 1);
        assert_eq!(insights.liquidity_indicators.exchange_inflows, Decimal::ZERO);
    }

    #[test]
    fn test_raw_volume_past_decimal_max_saturates() {
        let raw = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let transfers: Vec<TransferRecord> = (0..3)
            .map(|h| TransferRecord {
                value: raw,
                ..transfer(BINANCE, "0xw", 0, h)
            })
            .collect();
        let insights = build_onchain_insights(
            &SortedHolders::default(),
            &transfers,
            now(),
            &IntelligenceConfig::default(),
        );

        assert_eq!(insights.volume_analysis.total_volume, Decimal::MAX);
        assert_eq!(insights.volume_analysis.transfer_count, 3);
        assert_eq!(insights.liquidity_indicators.exchange_outflows, Decimal::MAX);
        assert_eq!(insights.liquidity_indicators.net_outflow(), Decimal::MAX);
        assert!(insights.whale_activity.whale_accumulation);
    }
}
