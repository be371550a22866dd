use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::thresholds::IntelligenceConfig;
use crate::models::{
    round_dp, ActionRecommendation, ImpactMagnitude, ImpactTimeframe, PriceDirection,
    PriceImpact, RecentActivity, RiskLevel, WhaleAction, WhaleBehaviorPattern, WhalePrediction,
    WhaleTierAnalysis,
};

pub fn predict_from_whale_activity(
    behavior: &WhaleBehaviorPattern,
    tiers: &WhaleTierAnalysis,
) -> WhalePrediction {
    predict_from_whale_activity_with(behavior, tiers, &IntelligenceConfig::default())
}

/// Directional price-impact call from a behaviour fingerprint and the tier split.
pub fn predict_from_whale_activity_with(
    behavior: &WhaleBehaviorPattern,
    tiers: &WhaleTierAnalysis,
    config: &IntelligenceConfig,
) -> WhalePrediction {
    let t = &config.prediction;
    let p = &behavior.patterns;

    let buy_heavy = p.buy_pressure > t.pressure_pct;
    let sell_heavy = p.sell_pressure > t.pressure_pct;

    let direction = match behavior.recent_activity {
        RecentActivity::Accumulating if buy_heavy => PriceDirection::Bullish,
        RecentActivity::Distributing if sell_heavy => PriceDirection::Bearish,
        _ => PriceDirection::Neutral,
    };

    let coordinated = behavior.coordinated_movements > 0;
    let (magnitude, timeframe) = if coordinated && !tiers.mega_whales.is_empty() {
        (ImpactMagnitude::High, ImpactTimeframe::ThreeDays)
    } else if buy_heavy || sell_heavy {
        (ImpactMagnitude::Medium, ImpactTimeframe::Day)
    } else {
        (ImpactMagnitude::Low, ImpactTimeframe::Day)
    };

    let mut raw = behavior.confidence_score * Decimal::ONE_HUNDRED;
    if coordinated {
        raw += Decimal::from(t.coordination_bonus);
    }
    if magnitude == ImpactMagnitude::High {
        raw += Decimal::from(t.high_magnitude_bonus);
    }
    let confidence = round_dp(raw.min(Decimal::from(t.max_confidence)), 0)
        .max(Decimal::ZERO)
        .to_u8()
        .unwrap_or(t.max_confidence);

    let mut reasoning = Vec::new();
    let action = if direction == PriceDirection::Bullish && confidence > t.act_confidence {
        reasoning.push(format!(
            "{} whales accumulating with {}% buy pressure",
            tiers.whale_count(),
            p.buy_pressure.normalize()
        ));
        if coordinated {
            reasoning.push(format!(
                "{} coordinated whale movements detected",
                behavior.coordinated_movements
            ));
        }
        WhaleAction::Buy
    } else if direction == PriceDirection::Bearish && confidence > t.act_confidence {
        reasoning.push(format!(
            "Whale distribution detected with {}% sell pressure",
            p.sell_pressure.normalize()
        ));
        WhaleAction::Sell
    } else if confidence < t.wait_confidence {
        reasoning.push(format!(
            "Insufficient whale signal ({confidence}% confidence), wait for clearer activity"
        ));
        WhaleAction::Wait
    } else {
        WhaleAction::Hold
    };

    let concentrated = tiers.concentration.concentration_risk == RiskLevel::High;
    if concentrated {
        reasoning.push(format!(
            "High concentration risk: top 10 holders control {}% of supply",
            tiers.concentration.top10_percentage.normalize()
        ));
    }

    let risk_level = if concentrated || magnitude == ImpactMagnitude::High {
        RiskLevel::High
    } else if confidence > t.low_risk_confidence {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    };

    tracing::debug!(
        symbol = %tiers.symbol,
        direction = ?direction,
        magnitude = ?magnitude,
        confidence,
        action = ?action,
        "Whale prediction generated"
    );

    WhalePrediction {
        price_impact: PriceImpact {
            direction,
            magnitude,
            timeframe,
            confidence,
        },
        recommendation: ActionRecommendation {
            action,
            reasoning,
            risk_level,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
