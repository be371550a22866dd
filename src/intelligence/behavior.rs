use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::thresholds::{BehaviorConfig, IntelligenceConfig};
use crate::models::{
    round_dp, saturating_div, PressureMetrics, RecentActivity, ScaledSum, SortedHolders,
    TransferRecord, WhaleBehaviorPattern,
};

/// Fingerprint whale behaviour over the trailing window ending now.
pub fn analyze_whale_behavior(
    transfers: &[TransferRecord],
    holders: &SortedHolders,
) -> WhaleBehaviorPattern {
    analyze_whale_behavior_at(transfers, holders, Utc::now())
}

pub fn analyze_whale_behavior_at(
    transfers: &[TransferRecord],
    holders: &SortedHolders,
    now: DateTime<Utc>,
) -> WhaleBehaviorPattern {
    analyze_whale_behavior_with(transfers, holders, now, &IntelligenceConfig::default())
}

/// The whale set is the top `whale_set_size` holders. Only transfers touching a
/// whale address within `window_hours` of `now` are considered.
pub fn analyze_whale_behavior_with(
    transfers: &[TransferRecord],
    holders: &SortedHolders,
    now: DateTime<Utc>,
    config: &IntelligenceConfig,
) -> WhaleBehaviorPattern {
    let cfg = &config.behavior;

    let whale_set: HashSet<String> = holders
        .top(cfg.whale_set_size)
        .iter()
        .map(|h| h.address.to_ascii_lowercase())
        .collect();

    let cutoff = Duration::try_hours(cfg.window_hours)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let recent: Vec<WhaleTransfer<'_>> = transfers
        .iter()
        .filter(|t| t.timestamp >= cutoff)
        .filter_map(|t| WhaleTransfer::classify(t, &whale_set))
        .collect();

    if recent.is_empty() {
        tracing::debug!(
            transfers = transfers.len(),
            whales = whale_set.len(),
            "No recent whale transfers, reporting holding defaults"
        );
        return quiet_pattern(config);
    }

    // Flows are kept in scaled units when the raw total would overflow;
    // ratios and pressures do not depend on the scale.
    let flows = ScaledSum::of(
        recent
            .iter()
            .filter(|t| t.from_whale != t.to_whale)
            .map(|t| t.record.amount()),
    );
    let mut inflow = Decimal::ZERO;
    let mut outflow = Decimal::ZERO;
    for t in &recent {
        let amount = flows.scale_down(t.record.amount());
        match (t.from_whale, t.to_whale) {
            (false, true) => inflow = inflow.saturating_add(amount),
            (true, false) => outflow = outflow.saturating_add(amount),
            _ => {}
        }
    }

    let coordinated_movements = count_coordinated_windows(&recent, cfg);
    let recent_activity = classify_activity(inflow, outflow, cfg);
    let patterns = pressure_metrics(inflow, outflow, flows.scale, holders.len());

    let count = Decimal::from(recent.len() as u64);
    let confidence_score = (count / Decimal::TEN * Decimal::new(8, 1) + Decimal::new(2, 1))
        .min(Decimal::ONE);

    tracing::debug!(
        whale_transfers = recent.len(),
        inflow = %inflow,
        outflow = %outflow,
        scaled = flows.is_scaled(),
        activity = %recent_activity,
        coordinated = coordinated_movements,
        "Whale behaviour analysed"
    );

    WhaleBehaviorPattern {
        recent_activity,
        coordinated_movements,
        average_hold_time: config.hold_time.for_activity(recent_activity).to_string(),
        historical_accuracy: config.historical_accuracy.for_activity(recent_activity),
        confidence_score,
        patterns,
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

struct WhaleTransfer<'a> {
    record: &'a TransferRecord,
    from_whale: bool,
    to_whale: bool,
}

impl<'a> WhaleTransfer<'a> {
    fn classify(record: &'a TransferRecord, whales: &HashSet<String>) -> Option<Self> {
        let from_whale = whales.contains(&record.from.to_ascii_lowercase());
        let to_whale = whales.contains(&record.to.to_ascii_lowercase());
        (from_whale || to_whale).then_some(Self {
            record,
            from_whale,
            to_whale,
        })
    }
}

/// No whale-touching transfers in the window.
fn quiet_pattern(config: &IntelligenceConfig) -> WhaleBehaviorPattern {
    let activity = RecentActivity::Holding;
    WhaleBehaviorPattern {
        recent_activity: activity,
        coordinated_movements: 0,
        average_hold_time: config.hold_time.for_activity(activity).to_string(),
        historical_accuracy: config.historical_accuracy.for_activity(activity),
        confidence_score: Decimal::new(3, 1),
        patterns: PressureMetrics {
            buy_pressure: Decimal::from(50),
            sell_pressure: Decimal::from(50),
            hodl_strength: Decimal::from(60),
        },
    }
}

/// Greedy fixed windows: each window opens at the first transfer not yet
/// absorbed and covers `[start, start + window)`.
fn count_coordinated_windows(transfers: &[WhaleTransfer<'_>], cfg: &BehaviorConfig) -> usize {
    let mut stamps: Vec<DateTime<Utc>> = transfers.iter().map(|t| t.record.timestamp).collect();
    stamps.sort();

    let window = Duration::try_seconds(cfg.coordination_window_secs);
    let mut coordinated = 0;
    let mut i = 0;
    while i < stamps.len() {
        let end = window.and_then(|w| stamps[i].checked_add_signed(w));
        let size = stamps[i..]
            .iter()
            .take_while(|ts| end.map_or(true, |end| **ts < end))
            .count()
            .max(1);
        if size >= cfg.coordination_min_transfers {
            coordinated += 1;
        }
        i += size;
    }
    coordinated
}

fn classify_activity(inflow: Decimal, outflow: Decimal, cfg: &BehaviorConfig) -> RecentActivity {
    let ratio = if outflow.is_zero() {
        if inflow > Decimal::ZERO {
            Decimal::TEN
        } else {
            Decimal::ONE
        }
    } else {
        saturating_div(inflow, outflow)
    };

    if ratio > cfg.accumulation_ratio {
        RecentActivity::Accumulating
    } else if ratio < cfg.distribution_ratio {
        RecentActivity::Distributing
    } else if !inflow.is_zero() || !outflow.is_zero() {
        RecentActivity::Mixed
    } else {
        RecentActivity::Holding
    }
}

/// `scale` converts the flow units back to raw amounts for the per-holder figure.
fn pressure_metrics(
    inflow: Decimal,
    outflow: Decimal,
    scale: Decimal,
    holder_count: usize,
) -> PressureMetrics {
    let total = inflow.saturating_add(outflow);
    let fifty = Decimal::from(50);

    let (buy_pressure, sell_pressure) = if total.is_zero() {
        (fifty, fifty)
    } else {
        (
            round_dp(saturating_div(inflow, total) * Decimal::ONE_HUNDRED, 2),
            round_dp(saturating_div(outflow, total) * Decimal::ONE_HUNDRED, 2),
        )
    };

    let per_holder = saturating_div(
        total.saturating_mul(scale),
        Decimal::from(holder_count.max(1) as u64),
    );
    let hodl_strength = round_dp(
        Decimal::ONE_HUNDRED
            .saturating_sub(per_holder.saturating_mul(Decimal::TEN))
            .max(Decimal::ZERO),
        2,
    );

    PressureMetrics {
        buy_pressure,
        sell_pressure,
        hodl_strength,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
