use rust_decimal::Decimal;

use super::exchanges::is_exchange_address;
use super::thresholds::{IntelligenceConfig, TierThresholds};
use crate::models::{
    round_dp, saturating_div, ConcentrationStats, HolderRecord, RiskLevel, ScaledSum,
    SortedHolders, WhaleHolder, WhaleTier, WhaleTierAnalysis,
};

/// Classify a holder snapshot into mega/whale/dolphin segments with the default thresholds.
pub fn classify_whale_tiers(holders: &SortedHolders, symbol: &str) -> WhaleTierAnalysis {
    classify_whale_tiers_with(holders, symbol, &IntelligenceConfig::default())
}

/// Full recompute over the snapshot. Supply is the sum of every balance,
/// including holders that end up as fish. Raw base-unit balances whose sum
/// exceeds `Decimal::MAX` are compared as shares of a scaled supply.
pub fn classify_whale_tiers_with(
    holders: &SortedHolders,
    symbol: &str,
    config: &IntelligenceConfig,
) -> WhaleTierAnalysis {
    let total_supply = ScaledSum::of(holders.as_slice().iter().map(HolderRecord::amount));
    if total_supply.is_scaled() {
        tracing::debug!(symbol, "Holder supply exceeds decimal range, using scaled shares");
    }

    let mut mega_whales = Vec::new();
    let mut whales = Vec::new();
    let mut dolphins = Vec::new();

    for holder in holders.as_slice() {
        let amount = holder.amount();
        let percentage = total_supply.share_pct(amount);
        let tier = assign_tier(amount, percentage, &config.tiers);

        let bucket = match tier {
            WhaleTier::Mega => &mut mega_whales,
            WhaleTier::Whale => &mut whales,
            WhaleTier::Dolphin => &mut dolphins,
            WhaleTier::Fish => continue,
        };

        let is_exchange = is_exchange_address(&holder.address);
        let label = if is_exchange {
            format!("Exchange wallet ({symbol})")
        } else {
            format!(
                "{} ({} of {symbol})",
                tier.label(),
                format_percentage(percentage)
            )
        };

        bucket.push(WhaleHolder {
            address: holder.address.clone(),
            balance: holder.balance,
            balance_formatted: round_dp(amount, 4).normalize().to_string(),
            percentage: round_dp(percentage, 4),
            tier,
            is_exchange,
            label,
        });
    }

    let concentration = concentration_stats(holders, total_supply, config);

    tracing::debug!(
        symbol,
        holders = holders.len(),
        mega = mega_whales.len(),
        whales = whales.len(),
        dolphins = dolphins.len(),
        top10 = %concentration.top10_percentage,
        gini = %concentration.gini_coefficient,
        "Whale tiers classified"
    );

    WhaleTierAnalysis {
        symbol: symbol.to_string(),
        mega_whales,
        whales,
        dolphins,
        total_holders: holders.len(),
        concentration,
    }
}

/// First matching tier wins; each tier is reached by share OR absolute balance.
pub fn assign_tier(amount: Decimal, percentage: Decimal, t: &TierThresholds) -> WhaleTier {
    if percentage >= t.mega_pct || amount >= t.mega_balance {
        WhaleTier::Mega
    } else if percentage >= t.whale_pct || amount >= t.whale_balance {
        WhaleTier::Whale
    } else if percentage >= t.dolphin_pct || amount >= t.dolphin_balance {
        WhaleTier::Dolphin
    } else {
        WhaleTier::Fish
    }
}

fn concentration_stats(
    holders: &SortedHolders,
    total_supply: ScaledSum,
    config: &IntelligenceConfig,
) -> ConcentrationStats {
    let top_share = |n: usize| {
        let held = holders
            .top(n)
            .iter()
            .map(|h| total_supply.scale_down(h.amount()))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        round_dp(saturating_div(held, total_supply.sum) * Decimal::ONE_HUNDRED, 2)
    };

    let top10_percentage = top_share(10);
    let top50_percentage = top_share(50);

    let amounts: Vec<Decimal> = holders.as_slice().iter().map(HolderRecord::amount).collect();
    let gini = gini_coefficient(&amounts);

    let thresholds = &config.concentration;
    let concentration_risk = if top10_percentage > thresholds.high_top10_pct {
        RiskLevel::High
    } else if top10_percentage > thresholds.medium_top10_pct {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    ConcentrationStats {
        top10_percentage,
        top50_percentage,
        gini_coefficient: gini,
        concentration_risk,
    }
}

/// Gini coefficient of `balances`, 0 = perfectly equal, approaching 1 = one holder owns all.
///
/// G = (2·Σ(i+1)·s_i − (n+1)) / n over shares s_i = b_i / Σb sorted ascending.
/// Working in shares keeps large raw balances from overflowing.
pub fn gini_coefficient(balances: &[Decimal]) -> Decimal {
    let n = balances.len();
    let total = ScaledSum::of(balances.iter().copied());
    if n == 0 || total.sum <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut sorted = balances.to_vec();
    sorted.sort();

    let weighted: Decimal = sorted
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let share = saturating_div(total.scale_down(*b), total.sum);
            Decimal::from(i as u64 + 1) * share
        })
        .sum();

    let n_dec = Decimal::from(n as u64);
    let gini = (Decimal::TWO * weighted - (n_dec + Decimal::ONE)) / n_dec;

    round_dp(gini.max(Decimal::ZERO), 4)
}

/// 1 dp at or above 1%, 2 dp at or above 0.1%, 3 dp below.
pub fn format_percentage(value: Decimal) -> String {
    let dp: usize = if value >= Decimal::ONE {
        1
    } else if value >= Decimal::new(1, 1) {
        2
    } else {
        3
    };
    format!("{:.*}%", dp, round_dp(value, dp as u32))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn holders(rows: &[(&str, i64)]) -> SortedHolders {
        SortedHolders::new(
            rows.iter()
                .map(|(a, b)| HolderRecord::new(*a, Decimal::from(*b)))
                .collect(),
        )
    }

    #[test]
    fn test_or_logic_across_thresholds() {
        // 2055 total: B is 2.43% (mega by share despite 50 < 1000),
        // C is 0.24% (whale by share despite 5 < 100)
        let t = classify_whale_tiers(&holders(&[("A", 2000), ("B", 50), ("C", 5)]), "TKN");
        assert_eq!(t.mega_whales.len(), 2);
        assert_eq!(t.whales.len(), 1);
        assert_eq!(t.whales[0].address, "C");
        assert_eq!(t.mega_whales[1].percentage, Decimal::new(24331, 4));
        assert_eq!(t.total_holders, 3);
    }

    #[test]
    fn test_balance_rule_catches_small_share() {
        // Huge supply: balance bars decide
        let mut rows = vec![("big", 100_000_000i64)];
        rows.push(("w", 150));
        rows.push(("d", 20));
        rows.push(("f", 1));
        let t = classify_whale_tiers(&holders(&rows), "TKN");
        assert_eq!(t.mega_whales.len(), 1);
        assert_eq!(t.whales[0].address, "w");
        assert_eq!(t.dolphins[0].address, "d");
        assert_eq!(t.total_holders, 4);
    }

    #[test]
    fn test_tiers_partition_input() {
        let rows: Vec<(String, i64)> = (1..=300).map(|i| (format!("h{i}"), i * i)).collect();
        let refs: Vec<(&str, i64)> = rows.iter().map(|(a, b)| (a.as_str(), *b)).collect();
        let sorted = holders(&refs);
        let t = classify_whale_tiers(&sorted, "TKN");

        let mut seen = std::collections::HashSet::new();
        for h in t.mega_whales.iter().chain(&t.whales).chain(&t.dolphins) {
            assert!(seen.insert(h.address.clone()), "{} appears twice", h.address);
        }
        let fish = sorted
            .as_slice()
            .iter()
            .filter(|h| !seen.contains(&h.address))
            .count();
        assert_eq!(seen.len() + fish, 300);
    }

    #[test]
    fn test_concentration_uses_top_holders() {
        let mut rows = vec![];
        for i in 0..10 {
            rows.push((format!("top{i}"), 80i64));
        }
        for i in 0..20 {
            rows.push((format!("tail{i}"), 10i64));
        }
        let refs: Vec<(&str, i64)> = rows.iter().map(|(a, b)| (a.as_str(), *b)).collect();
        let t = classify_whale_tiers(&holders(&refs), "TKN");
        // 800 / 1000
        assert_eq!(t.concentration.top10_percentage, Decimal::from(80));
        assert_eq!(t.concentration.top50_percentage, Decimal::from(100));
        assert_eq!(t.concentration.concentration_risk, RiskLevel::High);
    }

    #[test]
    fn test_exchange_flag_and_label() {
        let t = classify_whale_tiers(
            &holders(&[("0x3F5CE5FBFE3E9AF3971DD833D26BA9B5C936F0BE", 5000), ("0xabc", 5000)]),
            "ETH",
        );
        let exchange = &t.mega_whales[0];
        assert!(exchange.is_exchange);
        assert_eq!(exchange.label, "Exchange wallet (ETH)");
        assert!(!t.mega_whales[1].is_exchange);
        assert_eq!(t.mega_whales[1].label, "Mega Whale (50.0% of ETH)");
    }

    #[test]
    fn test_empty_snapshot() {
        let t = classify_whale_tiers(&SortedHolders::default(), "TKN");
        assert!(t.mega_whales.is_empty());
        assert_eq!(t.total_holders, 0);
        assert_eq!(t.concentration.top10_percentage, Decimal::ZERO);
        assert_eq!(t.concentration.gini_coefficient, Decimal::ZERO);
        assert_eq!(t.concentration.concentration_risk, RiskLevel::Low);
    }

    #[test]
    fn test_gini_bounds() {
        assert_eq!(gini_coefficient(&[]), Decimal::ZERO);
        assert_eq!(gini_coefficient(&[Decimal::from(42)]), Decimal::ZERO);
        assert_eq!(gini_coefficient(&[Decimal::from(7); 3]), Decimal::ZERO);

        // [1, 3]: (2·(1·0.25 + 2·0.75) − 3) / 2 = 0.25
        let g = gini_coefficient(&[Decimal::from(3), Decimal::ONE]);
        assert_eq!(g, Decimal::new(25, 2));

        let skewed: Vec<Decimal> = std::iter::once(Decimal::from(1_000_000))
            .chain(std::iter::repeat(Decimal::ONE).take(99))
            .collect();
        let g = gini_coefficient(&skewed);
        assert!(g > Decimal::new(9, 1) && g < Decimal::ONE);
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Decimal::new(97324, 3)), "97.3%");
        assert_eq!(format_percentage(Decimal::new(243, 3)), "0.24%");
        assert_eq!(format_percentage(Decimal::new(5, 3)), "0.005%");
    }

    #[test]
    fn test_raw_balances_past_decimal_max() {
        // 18-decimal raw units: each holder alone is near the Decimal ceiling
        let raw = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let sorted = SortedHolders::new(vec![
            HolderRecord::new("0xa", raw),
            HolderRecord::new("0xb", raw),
        ]);

        let t = classify_whale_tiers(&sorted, "TKN");
        assert_eq!(t.mega_whales.len(), 2);
        assert_eq!(t.mega_whales[0].percentage, Decimal::from(50));
        assert_eq!(t.concentration.top10_percentage, Decimal::from(100));
        assert_eq!(t.concentration.gini_coefficient, Decimal::ZERO);
    }
}
