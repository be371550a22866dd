//! Rule-based trade recommendation.
//!
//! The engine is an ordered table of rules folded over an [`EvaluationState`].
//! Each rule sees the state left by the previous one (already clamped) and may
//! halt the cascade, in which case every later rule is skipped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::input::TimeFrameRisk;
use super::onchain::{calculate_onchain_adjustment, summarize_onchain};
use super::risk_metrics::MAX_ACCEPTABLE_LOSS_PCT;
use crate::models::{
    OnchainInsights, OnchainSummary, Recommendation, RiskMetrics, TradeAnalysis, TradeSetup,
};

const MIN_CONFIDENCE: i32 = 20;
const MAX_CONFIDENCE: i32 = 95;
/// Floor applied once leverage has been priced in.
const LEVERAGE_CONFIDENCE_FLOOR: i32 = 25;

const EXCELLENT_RATIO: Decimal = Decimal::from_parts(3, 0, 0, false, 0);
const GOOD_RATIO: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
const ACCEPTABLE_RATIO: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

const MODERATE_LEVERAGE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
const HIGH_LEVERAGE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

const HIGH_RISK_LOSS_PCT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const HIGH_PROFIT_TARGET_PCT: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

const TECHNICAL_TERMS: &[&str] = &[
    "support",
    "resistance",
    "fibonacci",
    "rsi",
    "macd",
    "moving average",
    "bollinger",
    "volume",
    "trend",
    "breakout",
    "reversal",
    "divergence",
    "oversold",
    "overbought",
    "momentum",
    "pattern",
    "channel",
];

/// Read-only inputs shared by every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub setup: &'a TradeSetup,
    pub metrics: &'a RiskMetrics,
    pub onchain: Option<&'a OnchainInsights>,
}

/// Intermediate verdict threaded through the rule table.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationState {
    pub recommendation: Recommendation,
    pub confidence: i32,
    pub analysis: String,
    pub key_points: Vec<String>,
    pub onchain_summary: Option<OnchainSummary>,
    pub halted: bool,
}

impl Default for EvaluationState {
    fn default() -> Self {
        Self {
            recommendation: Recommendation::Hold,
            confidence: 50,
            analysis: String::new(),
            key_points: Vec::new(),
            onchain_summary: None,
            halted: false,
        }
    }
}

impl EvaluationState {
    fn adjust_confidence(&mut self, change: i32, min: i32) {
        self.confidence = (self.confidence + change).clamp(min, MAX_CONFIDENCE);
    }

    fn halt(mut self, recommendation: Recommendation, confidence: i32, analysis: &str) -> Self {
        self.recommendation = recommendation;
        self.confidence = confidence;
        self.analysis = analysis.to_string();
        self.halted = true;
        self
    }
}

pub type Rule = fn(EvaluationState, &RuleContext<'_>) -> EvaluationState;

/// Evaluation order matters: hard overrides must run before the adjustments they pre-empt.
pub const RULES: &[(&str, Rule)] = &[
    ("validity", validity_gate),
    ("risk_reward", risk_reward_base),
    ("time_frame", time_frame_risk),
    ("leverage", leverage_risk),
    ("loss_magnitude", loss_magnitude),
    ("profit_magnitude", profit_magnitude),
    ("reasoning_quality", reasoning_quality),
    ("risk_warnings", risk_warnings),
    ("onchain", onchain_adjustment),
];

/// Score a trade setup into a recommendation with a bounded confidence.
pub fn generate_recommendation(
    metrics: &RiskMetrics,
    setup: &TradeSetup,
    onchain: Option<&OnchainInsights>,
) -> TradeAnalysis {
    let ctx = RuleContext {
        setup,
        metrics,
        onchain,
    };

    let state = RULES
        .iter()
        .fold(EvaluationState::default(), |state, (name, rule)| {
            if state.halted {
                return state;
            }
            let next = rule(state, &ctx);
            tracing::trace!(
                rule = name,
                recommendation = %next.recommendation,
                confidence = next.confidence,
                halted = next.halted,
                "Recommendation rule applied"
            );
            next
        });

    tracing::debug!(
        pair = %setup.trading_pair,
        recommendation = %state.recommendation,
        confidence = state.confidence,
        onchain = onchain.is_some(),
        "Trade recommendation generated"
    );

    TradeAnalysis {
        trading_pair: setup.trading_pair.clone(),
        risk_metrics: metrics.clone(),
        recommendation: state.recommendation,
        confidence: state.confidence.clamp(0, 100) as u8,
        analysis: state.analysis,
        key_points: state.key_points,
        onchain_summary: state.onchain_summary,
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub fn validity_gate(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    if ctx.metrics.is_valid_setup {
        return state;
    }
    state.key_points.push("Invalid risk/reward structure".into());
    state.halt(
        Recommendation::StrongAvoid,
        90,
        "This trade setup has fundamental issues that make it unsuitable for execution.",
    )
}

pub fn risk_reward_base(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    let ratio = ctx.metrics.risk_reward_ratio;
    let shown = ratio.normalize();

    let (recommendation, confidence, analysis, key_point) = if ratio >= EXCELLENT_RATIO {
        (
            Recommendation::StrongBuy,
            85,
            "Excellent risk-reward ratio with strong upside potential.",
            format!("Outstanding {shown}:1 risk-reward ratio"),
        )
    } else if ratio >= GOOD_RATIO {
        (
            Recommendation::Buy,
            75,
            "Good risk-reward ratio that meets professional trading standards.",
            format!("Solid {shown}:1 risk-reward ratio"),
        )
    } else if ratio >= ACCEPTABLE_RATIO {
        (
            Recommendation::Buy,
            65,
            "Acceptable risk-reward ratio for experienced traders.",
            format!("Acceptable {shown}:1 risk-reward ratio"),
        )
    } else if ratio >= Decimal::ONE {
        (
            Recommendation::Hold,
            45,
            "Marginal risk-reward ratio. Consider waiting for better opportunities.",
            format!("Low {shown}:1 risk-reward ratio"),
        )
    } else {
        (
            Recommendation::Avoid,
            80,
            "Poor risk-reward ratio where potential losses exceed gains.",
            "Risk exceeds potential reward".to_string(),
        )
    };

    state.recommendation = recommendation;
    state.confidence = confidence;
    state.analysis = analysis.to_string();
    state.key_points.push(key_point);
    state
}

pub fn time_frame_risk(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    let risk = TimeFrameRisk::classify(&ctx.setup.time_frame);

    let (key_point, change) = match risk {
        TimeFrameRisk::High => ("Scalping requires advanced skills and tight risk management", 0),
        TimeFrameRisk::Medium => (
            "Day trading requires active monitoring and quick decision making",
            0,
        ),
        TimeFrameRisk::Low => ("Swing trading allows for better analysis and less stress", 5),
    };
    state.key_points.push(key_point.into());
    state.adjust_confidence(change, MIN_CONFIDENCE);

    if risk == TimeFrameRisk::High && ctx.setup.leverage > MODERATE_LEVERAGE {
        return state.halt(
            Recommendation::StrongAvoid,
            85,
            "High leverage scalping is extremely risky and not recommended.",
        );
    }

    state
}

pub fn leverage_risk(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    let leverage = ctx.setup.leverage;
    let shown = leverage.normalize();

    let change = if leverage > HIGH_LEVERAGE {
        state
            .key_points
            .push(format!("High leverage ({shown}x) significantly increases risk"));
        state.recommendation = state.recommendation.downgrade();
        -20
    } else if leverage > MODERATE_LEVERAGE {
        state
            .key_points
            .push(format!("Moderate leverage ({shown}x) increases risk"));
        -10
    } else if leverage > Decimal::ONE {
        state
            .key_points
            .push(format!("Low leverage ({shown}x) - manageable risk increase"));
        0
    } else {
        0
    };

    state.adjust_confidence(change, LEVERAGE_CONFIDENCE_FLOOR);
    state
}

pub fn loss_magnitude(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    let loss_pct = ctx.metrics.loss_percentage;

    if loss_pct > HIGH_RISK_LOSS_PCT {
        state.recommendation = Recommendation::StrongAvoid;
        state.adjust_confidence(20, MIN_CONFIDENCE);
        state.key_points.push(format!(
            "Excessive risk exposure (>{HIGH_RISK_LOSS_PCT}% loss potential)"
        ));
    } else if loss_pct > MAX_ACCEPTABLE_LOSS_PCT {
        if state.recommendation == Recommendation::StrongBuy {
            state.recommendation = state.recommendation.downgrade();
        }
        state
            .key_points
            .push("High risk exposure - consider reducing position size".into());
    }

    state
}

pub fn profit_magnitude(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    if ctx.metrics.profit_percentage > HIGH_PROFIT_TARGET_PCT {
        state.key_points.push("High profit potential".into());
        state.adjust_confidence(10, MIN_CONFIDENCE);
    }
    state
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningQuality {
    Poor,
    Average,
    Good,
}

/// Grade the written rationale by length and technical vocabulary.
/// Each vocabulary term counts once no matter how often it appears.
pub fn assess_reasoning_quality(setup: &TradeSetup) -> ReasoningQuality {
    let text = setup.combined_reasoning().to_lowercase();
    let words = text.split_whitespace().count();
    let terms = TECHNICAL_TERMS
        .iter()
        .filter(|term| text.contains(*term))
        .count();

    if words < 15 || terms < 2 {
        ReasoningQuality::Poor
    } else if words > 50 && terms >= 4 {
        ReasoningQuality::Good
    } else {
        ReasoningQuality::Average
    }
}

pub fn reasoning_quality(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    match assess_reasoning_quality(ctx.setup) {
        ReasoningQuality::Poor => {
            state.recommendation = state.recommendation.downgrade();
            state
                .key_points
                .push("Trade reasoning needs more detail and analysis".into());
            state.adjust_confidence(-15, MIN_CONFIDENCE);
        }
        ReasoningQuality::Good => {
            state.key_points.push("Well-reasoned trade setup".into());
            state.adjust_confidence(5, MIN_CONFIDENCE);
        }
        ReasoningQuality::Average => {}
    }
    state
}

pub fn risk_warnings(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    state
        .key_points
        .extend(ctx.metrics.warnings.iter().cloned());
    state
}

pub fn onchain_adjustment(mut state: EvaluationState, ctx: &RuleContext<'_>) -> EvaluationState {
    let Some(insights) = ctx.onchain else {
        return state;
    };

    let summary = summarize_onchain(insights);
    let adjustment = calculate_onchain_adjustment(insights);
    let before = (state.recommendation, state.confidence);

    state.adjust_confidence(adjustment.confidence_delta, MIN_CONFIDENCE);
    state.recommendation = state.recommendation.step(adjustment.recommendation_boost);

    tracing::debug!(
        from = %before.0,
        to = %state.recommendation,
        confidence_before = before.1,
        confidence_after = state.confidence,
        boost = adjustment.recommendation_boost,
        "On-chain adjustment applied"
    );

    state.key_points.extend(summary.lines().cloned());
    state.onchain_summary = Some(summary);
    state
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
