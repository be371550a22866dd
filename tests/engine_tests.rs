mod common;

use std::collections::HashSet;

use rust_decimal::Decimal;

use tradelens::analysis::{calculate_risk_metrics, generate_recommendation};
use tradelens::intelligence::{
    analyze_whale_behavior_at, build_onchain_insights, classify_whale_tiers, gini_coefficient,
    predict_from_whale_activity, IntelligenceConfig,
};
use tradelens::models::{
    round_dp, ImpactMagnitude, PriceDirection, Recommendation, RecentActivity, RiskLevel,
    WhaleAction,
};

use common::{fixed_now, holders, minutes_before, onchain, trade_setup, transfer, BINANCE};

// ---------------------------------------------------------------------------
// Trade scoring scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_detailed_setup_scores_buy_80() {
    let setup = trade_setup(100, 110, 95);
    let metrics = calculate_risk_metrics(&setup);

    assert_eq!(metrics.risk_reward_ratio, Decimal::from(2));
    assert!(metrics.is_valid_setup);
    assert!(metrics.warnings.is_empty());

    let analysis = generate_recommendation(&metrics, &setup, None);
    assert_eq!(analysis.recommendation, Recommendation::Buy);
    assert_eq!(analysis.confidence, 80);
    assert_eq!(analysis.key_points[0], "Solid 2:1 risk-reward ratio");
    assert!(analysis.key_points.contains(&"Well-reasoned trade setup".to_string()));
    assert!(analysis.onchain_summary.is_none());
}

#[test]
fn test_leveraged_scalp_is_strong_avoid() {
    let mut setup = trade_setup(100, 110, 95);
    setup.leverage = Decimal::from(15);
    setup.time_frame = "scalping".into();
    let metrics = calculate_risk_metrics(&setup);

    let insights = onchain(true, false, 0, 150_000_000, 500_000_000);

    let analysis = generate_recommendation(&metrics, &setup, Some(&insights));
    assert_eq!(analysis.recommendation, Recommendation::StrongAvoid);
    assert_eq!(analysis.confidence, 85);
    // Halted before the on-chain rule
    assert!(analysis.onchain_summary.is_none());
}

#[test]
fn test_onchain_accumulation_lifts_to_strong_buy() {
    let setup = trade_setup(100, 110, 95);
    let metrics = calculate_risk_metrics(&setup);
    let insights = onchain(true, false, 0, 150_000_000, 500_000_000);

    let analysis = generate_recommendation(&metrics, &setup, Some(&insights));
    assert_eq!(analysis.recommendation, Recommendation::StrongBuy);
    assert_eq!(analysis.confidence, 95);

    let summary = analysis.onchain_summary.expect("on-chain summary attached");
    assert!(summary.whale_activity[0].starts_with("Whale accumulation detected"));
    assert_eq!(
        summary.liquidity_flow[0],
        "Strong exchange outflow: $150.0M (bullish signal)"
    );
}

#[test]
fn test_invalid_structure_short_circuits() {
    // TP below risk: ratio 0.2
    let setup = trade_setup(100, 102, 90);
    let metrics = calculate_risk_metrics(&setup);
    assert!(!metrics.is_valid_setup);

    let analysis = generate_recommendation(&metrics, &setup, None);
    assert_eq!(analysis.recommendation, Recommendation::StrongAvoid);
    assert_eq!(analysis.confidence, 90);
    assert_eq!(analysis.key_points, vec!["Invalid risk/reward structure".to_string()]);
}

// ---------------------------------------------------------------------------
// Trade scoring properties
// ---------------------------------------------------------------------------

#[test]
fn test_ratio_is_reward_over_risk() {
    for entry in [50i64, 100, 1_234] {
        for reward in [1i64, 3, 7, 40] {
            for risk in [1i64, 2, 9, 25] {
                if risk >= entry {
                    continue;
                }
                let setup = trade_setup(entry, entry + reward, entry - risk);
                let metrics = calculate_risk_metrics(&setup);
                let expected = round_dp(Decimal::from(reward) / Decimal::from(risk), 2);
                assert_eq!(metrics.risk_reward_ratio, expected, "{entry}/{reward}/{risk}");
            }
        }
    }
}

#[test]
fn test_validity_tracks_ratio() {
    // 2.0, 0.8, 1.0 (boundary), 0.5
    for (tp, sl, valid) in [(110, 95, true), (104, 95, false), (110, 90, true), (101, 98, false)] {
        let metrics = calculate_risk_metrics(&trade_setup(100, tp, sl));
        let expected = metrics.risk_reward_ratio >= Decimal::ONE
            && metrics.potential_profit > Decimal::ZERO
            && metrics.potential_loss > Decimal::ZERO;
        assert_eq!(metrics.is_valid_setup, expected);
        assert_eq!(metrics.is_valid_setup, valid, "tp={tp} sl={sl}");
    }
}

#[test]
fn test_confidence_stays_in_bounds() {
    let take_profits = [101i64, 104, 110, 120, 160, 300];
    let stop_losses = [99i64, 97, 95, 90, 80];
    let leverages = [1i64, 3, 7, 20];
    let time_frames = ["scalping", "1h", "swing"];
    let reasonings = ["", "support", common::DETAILED_REASONING];
    let onchains = [
        None,
        Some(onchain(true, false, 0, 200_000_000, 2_000_000_000)),
        Some(onchain(false, true, 200_000_000, 0, 1_000)),
        Some(onchain(true, true, 40_000_000, 0, 50_000_000)),
    ];

    for tp in take_profits {
        for sl in stop_losses {
            for lev in leverages {
                for tf in time_frames {
                    for reasoning in reasonings {
                        for oc in &onchains {
                            let mut setup = trade_setup(100, tp, sl);
                            setup.leverage = Decimal::from(lev);
                            setup.time_frame = tf.into();
                            setup.entry_reasoning = reasoning.into();
                            let metrics = calculate_risk_metrics(&setup);
                            let a = generate_recommendation(&metrics, &setup, oc.as_ref());
                            assert!(
                                (20..=95).contains(&a.confidence),
                                "confidence {} out of bounds for tp={tp} sl={sl} lev={lev} tf={tf}",
                                a.confidence
                            );
                        }
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Whale intelligence
// ---------------------------------------------------------------------------

#[test]
fn test_tiers_or_logic_small_snapshot() {
    let tiers = classify_whale_tiers(&holders(&[("A", 2000), ("B", 50), ("C", 5)]), "TKN");

    // Every holder clears at least one bar by share of a 2055 supply
    let mega: Vec<&str> = tiers.mega_whales.iter().map(|h| h.address.as_str()).collect();
    assert_eq!(mega, vec!["A", "B"]);
    assert_eq!(tiers.whales[0].address, "C");
    assert!(tiers.dolphins.is_empty());
    assert_eq!(tiers.mega_whales[0].percentage, Decimal::new(973236, 4));
}

#[test]
fn test_tier_lists_partition_holders() {
    let rows: Vec<(String, i64)> = (0..500)
        .map(|i| (format!("0x{i:04}"), 1 + (i * 37) % 2_500))
        .collect();
    let refs: Vec<(&str, i64)> = rows.iter().map(|(a, b)| (a.as_str(), *b)).collect();
    let snapshot = holders(&refs);
    let tiers = classify_whale_tiers(&snapshot, "TKN");

    let mut tiered = HashSet::new();
    for h in tiers.mega_whales.iter().chain(&tiers.whales).chain(&tiers.dolphins) {
        assert!(tiered.insert(h.address.as_str()), "{} in two tiers", h.address);
    }
    let fish: HashSet<&str> = snapshot
        .as_slice()
        .iter()
        .map(|h| h.address.as_str())
        .filter(|a| !tiered.contains(a))
        .collect();
    assert_eq!(tiered.len() + fish.len(), 500);
    assert_eq!(tiers.total_holders, 500);
}

#[test]
fn test_gini_bounds() {
    assert_eq!(gini_coefficient(&[Decimal::from(10)]), Decimal::ZERO);
    assert_eq!(gini_coefficient(&[Decimal::from(10); 8]), Decimal::ZERO);

    for n in 2..40u64 {
        let balances: Vec<Decimal> = (1..=n).map(|i| Decimal::from(i * i)).collect();
        let g = gini_coefficient(&balances);
        assert!(g > Decimal::ZERO && g < Decimal::ONE, "n={n} gini={g}");
    }
}

#[test]
fn test_stale_transfers_give_holding_defaults() {
    let now = fixed_now();
    let snapshot = holders(&[("0xwhale", 10_000), ("0xother", 100)]);
    let transfers = vec![
        transfer(BINANCE, "0xwhale", 5_000, minutes_before(now, 60 * 49)),
        transfer("0xwhale", BINANCE, 5_000, minutes_before(now, 60 * 96)),
    ];

    let behavior = analyze_whale_behavior_at(&transfers, &snapshot, now);
    assert_eq!(behavior.recent_activity, RecentActivity::Holding);
    assert_eq!(behavior.confidence_score, Decimal::new(3, 1));
    assert_eq!(behavior.patterns.buy_pressure, Decimal::from(50));
    assert_eq!(behavior.patterns.sell_pressure, Decimal::from(50));
    assert_eq!(behavior.patterns.hodl_strength, Decimal::from(60));
}

#[test]
fn test_whale_pipeline_coordinated_accumulation() {
    let now = fixed_now();
    let snapshot = holders(&[
        ("0xmega", 900_000),
        ("0xwhale2", 60_000),
        ("0xwhale3", 30_000),
        ("0xfish", 5),
    ]);
    let transfers: Vec<_> = (0..10)
        .map(|i| transfer(BINANCE, "0xMEGA", 1_000, minutes_before(now, 5 * i)))
        .collect();

    let tiers = classify_whale_tiers(&snapshot, "TKN");
    assert_eq!(tiers.concentration.concentration_risk, RiskLevel::High);

    let behavior = analyze_whale_behavior_at(&transfers, &snapshot, now);
    assert_eq!(behavior.recent_activity, RecentActivity::Accumulating);
    assert_eq!(behavior.coordinated_movements, 1);
    assert_eq!(behavior.confidence_score, Decimal::ONE);
    assert_eq!(behavior.patterns.buy_pressure, Decimal::from(100));

    let prediction = predict_from_whale_activity(&behavior, &tiers);
    assert_eq!(prediction.price_impact.direction, PriceDirection::Bullish);
    assert_eq!(prediction.price_impact.magnitude, ImpactMagnitude::High);
    assert_eq!(prediction.price_impact.confidence, 95);
    assert_eq!(prediction.recommendation.action, WhaleAction::Buy);
    assert_eq!(prediction.recommendation.risk_level, RiskLevel::High);
    assert!(prediction
        .recommendation
        .reasoning
        .last()
        .is_some_and(|r| r.starts_with("High concentration risk")));
}

#[test]
fn test_aggregated_insights_feed_recommendation() {
    let now = fixed_now();
    let snapshot = holders(&[("0xwhale", 5_000_000), ("0xsmall", 10)]);
    let transfers = vec![
        transfer(BINANCE, "0xa", 400_000, minutes_before(now, 10)),
        transfer(BINANCE, "0xb", 300_000, minutes_before(now, 20)),
        transfer("0xc", BINANCE, 200_000, minutes_before(now, 30)),
    ];

    let insights =
        build_onchain_insights(&snapshot, &transfers, now, &IntelligenceConfig::default());
    assert!(insights.whale_activity.whale_accumulation);
    assert_eq!(insights.whale_activity.top_holders.len(), 1);

    let setup = trade_setup(100, 110, 95);
    let metrics = calculate_risk_metrics(&setup);
    let analysis = generate_recommendation(&metrics, &setup, Some(&insights));

    // Accumulation +15, low volume -5 → +10; boost +1
    assert_eq!(analysis.recommendation, Recommendation::StrongBuy);
    assert_eq!(analysis.confidence, 90);
}
