use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    percentage_of, round_dp, saturating_div, ExitReason, OutcomeStatus, PredictionAccuracy,
    RealizedMetrics, Recommendation, TradeOutcome, TradeSetup,
};

/// Above this confidence a verdict is only justified by a profitable trade.
const HIGH_CONFIDENCE: u8 = 70;
/// Below the high-confidence bar, staying within this P&L band justifies the call.
const MODEST_MOVE_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Realised swings beyond this mean the risk was misjudged.
const RISK_BAND_PCT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutcomeError {
    #[error("Price must be a positive number")]
    NonPositivePrice,

    #[error("Trade outcome is {actual}, expected {expected}")]
    InvalidTransition {
        actual: OutcomeStatus,
        expected: OutcomeStatus,
    },

    #[error("Trade outcome is already {0}")]
    AlreadyClosed(OutcomeStatus),
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Planned → Entered.
pub fn record_entry(
    outcome: &mut TradeOutcome,
    price: Decimal,
    notes: String,
    at: DateTime<Utc>,
) -> Result<(), OutcomeError> {
    require_status(outcome, OutcomeStatus::Planned)?;
    if price <= Decimal::ZERO {
        return Err(OutcomeError::NonPositivePrice);
    }

    outcome.actual_entry = Some(price);
    outcome.entered_at = Some(at);
    outcome.entry_notes = notes;
    outcome.status = OutcomeStatus::Entered;
    Ok(())
}

/// Entered → Exited. Fills in the realised P&L, hold time and accuracy.
pub fn record_exit(
    outcome: &mut TradeOutcome,
    price: Decimal,
    reason: ExitReason,
    notes: String,
    at: DateTime<Utc>,
) -> Result<(), OutcomeError> {
    require_status(outcome, OutcomeStatus::Entered)?;
    if price <= Decimal::ZERO {
        return Err(OutcomeError::NonPositivePrice);
    }
    let Some(entry) = outcome.actual_entry else {
        return Err(OutcomeError::InvalidTransition {
            actual: OutcomeStatus::Planned,
            expected: OutcomeStatus::Entered,
        });
    };

    let setup = &outcome.setup;
    let pnl = calculate_pnl(entry, price, setup.position_size, setup.leverage);
    let pnl_pct = pnl_percentage(entry, price, setup.leverage);

    outcome.metrics = Some(RealizedMetrics {
        actual_risk_reward_ratio: round_dp(actual_risk_reward(setup, entry, price), 2),
        holding_period_return: round_dp(pnl_pct, 2),
    });
    outcome.accuracy = Some(prediction_accuracy(
        outcome.recommendation,
        outcome.confidence,
        entry,
        price,
        pnl_pct,
    ));
    outcome.actual_exit = Some(price);
    outcome.exited_at = Some(at);
    outcome.exit_reason = Some(reason);
    outcome.exit_notes = notes;
    outcome.actual_pnl = Some(round_dp(pnl, 2));
    outcome.actual_pnl_percentage = Some(round_dp(pnl_pct, 2));
    outcome.time_held_secs = outcome
        .entered_at
        .map(|entered| (at - entered).num_seconds().max(0));
    outcome.status = OutcomeStatus::Exited;

    tracing::info!(
        outcome_id = %outcome.id,
        pair = %outcome.setup.trading_pair,
        pnl = %round_dp(pnl, 2),
        pnl_pct = %round_dp(pnl_pct, 2),
        reason = ?reason,
        "Trade outcome closed"
    );
    Ok(())
}

/// Planned or Entered → Cancelled.
pub fn cancel(outcome: &mut TradeOutcome) -> Result<(), OutcomeError> {
    if matches!(
        outcome.status,
        OutcomeStatus::Exited | OutcomeStatus::Cancelled
    ) {
        return Err(OutcomeError::AlreadyClosed(outcome.status));
    }
    outcome.status = OutcomeStatus::Cancelled;
    Ok(())
}

fn require_status(outcome: &TradeOutcome, expected: OutcomeStatus) -> Result<(), OutcomeError> {
    if outcome.status != expected {
        return Err(OutcomeError::InvalidTransition {
            actual: outcome.status,
            expected,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-trade figures
// ---------------------------------------------------------------------------

/// Position size × relative price change × leverage.
pub fn calculate_pnl(
    entry: Decimal,
    exit: Decimal,
    position_size: Decimal,
    leverage: Decimal,
) -> Decimal {
    let change = saturating_div(exit.saturating_sub(entry), entry);
    position_size.saturating_mul(change).saturating_mul(leverage)
}

/// Leveraged percentage move from entry to exit.
pub fn pnl_percentage(entry: Decimal, exit: Decimal, leverage: Decimal) -> Decimal {
    percentage_of(exit.saturating_sub(entry), entry).saturating_mul(leverage)
}

/// Realised move measured in units of the planned stop distance. Zero when
/// the setup had no stop distance.
pub fn actual_risk_reward(setup: &TradeSetup, entry: Decimal, exit: Decimal) -> Decimal {
    let planned_risk = setup
        .entry_price
        .saturating_sub(setup.stop_loss_price)
        .abs();
    saturating_div(exit.saturating_sub(entry), planned_risk).abs()
}

/// BUY and STRONG_BUY are bullish calls; everything else counts as bearish.
pub fn prediction_accuracy(
    recommendation: Recommendation,
    confidence: u8,
    entry: Decimal,
    exit: Decimal,
    pnl_pct: Decimal,
) -> PredictionAccuracy {
    let predicted_bullish = recommendation >= Recommendation::Buy;
    let moved_up = exit > entry;

    let confidence_justified = if confidence > HIGH_CONFIDENCE {
        pnl_pct > Decimal::ZERO
    } else {
        pnl_pct.abs() < MODEST_MOVE_PCT
    };

    PredictionAccuracy {
        direction_correct: predicted_bullish == moved_up,
        confidence_justified,
        risk_assessment_accurate: pnl_pct.abs() < RISK_BAND_PCT,
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    /// `YYYY-MM` of the exit.
    pub month: String,
    pub pnl: Decimal,
    pub trades: usize,
}

/// Track record over a set of outcomes. Money figures are in the position's
/// quote currency, percentages are 0-100, all rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub completed_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,

    pub win_rate: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    /// Gross profit over gross loss; `None` when there were wins but no losses.
    pub profit_factor: Option<Decimal>,
    pub expectancy: Decimal,

    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub max_drawdown: Decimal,

    pub prediction_accuracy_rate: Decimal,
    pub confidence_vs_outcome: Decimal,

    pub average_holding_period_secs: i64,
    pub best_time_frame: Option<String>,

    pub total_pnl: Decimal,
    pub total_pnl_percentage: Decimal,
    pub monthly_returns: Vec<MonthlyReturn>,
}

/// Score every completed outcome, oldest exit first. Planned, open and
/// cancelled outcomes only count toward `total_trades`.
pub fn performance_metrics(outcomes: &[TradeOutcome]) -> PerformanceMetrics {
    let mut completed: Vec<&TradeOutcome> = outcomes.iter().filter(|o| o.is_completed()).collect();
    completed.sort_by_key(|o| o.exited_at);

    let pnls: Vec<Decimal> = completed
        .iter()
        .map(|o| o.actual_pnl.unwrap_or_default())
        .collect();
    let wins: Vec<Decimal> = pnls.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
    let losses: Vec<Decimal> = pnls.iter().copied().filter(|p| *p < Decimal::ZERO).collect();

    let total_pnl = saturating_sum(&pnls);
    let gross_profit = saturating_sum(&wins);
    let gross_loss = saturating_sum(&losses).abs();

    let judged: Vec<&PredictionAccuracy> =
        completed.iter().filter_map(|o| o.accuracy.as_ref()).collect();
    let correct = judged.iter().filter(|a| a.direction_correct).count();

    let total_pnl_percentage = saturating_sum(
        &completed
            .iter()
            .map(|o| o.actual_pnl_percentage.unwrap_or_default())
            .collect::<Vec<_>>(),
    );

    PerformanceMetrics {
        total_trades: outcomes.len(),
        completed_trades: completed.len(),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        win_rate: round_dp(ratio_pct(wins.len(), completed.len()), 2),
        average_win: round_dp(mean(gross_profit, wins.len()), 2),
        average_loss: round_dp(mean(gross_loss, losses.len()), 2),
        profit_factor: profit_factor(gross_profit, gross_loss),
        expectancy: round_dp(mean(total_pnl, completed.len()), 2),
        largest_win: wins.iter().copied().max().unwrap_or_default(),
        largest_loss: losses.iter().copied().min().unwrap_or_default(),
        max_consecutive_wins: max_consecutive(&pnls, true),
        max_consecutive_losses: max_consecutive(&pnls, false),
        max_drawdown: round_dp(max_drawdown(&pnls), 2),
        prediction_accuracy_rate: round_dp(ratio_pct(correct, judged.len()), 2),
        confidence_vs_outcome: round_dp(confidence_vs_outcome(&completed), 2),
        average_holding_period_secs: average_holding_period(&completed),
        best_time_frame: best_time_frame(&completed),
        total_pnl: round_dp(total_pnl, 2),
        total_pnl_percentage: round_dp(total_pnl_percentage, 2),
        monthly_returns: monthly_returns(&completed),
    }
}

/// Longest run of wins (`wins = true`) or of non-winning trades.
pub fn max_consecutive(pnls: &[Decimal], wins: bool) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for pnl in pnls {
        if (*pnl > Decimal::ZERO) == wins {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Largest peak-to-trough fall of the running P&L, starting from zero.
pub fn max_drawdown(pnls: &[Decimal]) -> Decimal {
    let mut balance = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;
    for pnl in pnls {
        balance = balance.saturating_add(*pnl);
        peak = peak.max(balance);
        worst = worst.max(peak.saturating_sub(balance));
    }
    worst
}

/// Mean of `confidence × win` over completed trades, as a percentage.
/// Rewards confident calls that paid off; losses contribute nothing.
pub fn confidence_vs_outcome(completed: &[&TradeOutcome]) -> Decimal {
    if completed.is_empty() {
        return Decimal::ZERO;
    }
    let weighted: u64 = completed
        .iter()
        .filter(|o| o.actual_pnl.is_some_and(|p| p > Decimal::ZERO))
        .map(|o| u64::from(o.confidence))
        .sum();
    Decimal::from(weighted) / Decimal::from(completed.len() as u64)
}

fn profit_factor(gross_profit: Decimal, gross_loss: Decimal) -> Option<Decimal> {
    if gross_loss.is_zero() {
        return if gross_profit > Decimal::ZERO {
            None
        } else {
            Some(Decimal::ZERO)
        };
    }
    Some(round_dp(saturating_div(gross_profit, gross_loss), 2))
}

fn average_holding_period(completed: &[&TradeOutcome]) -> i64 {
    let held: Vec<i64> = completed.iter().filter_map(|o| o.time_held_secs).collect();
    if held.is_empty() {
        return 0;
    }
    let total: i128 = held.iter().map(|s| i128::from(*s)).sum();
    (total / held.len() as i128) as i64
}

/// Time frame with the highest summed P&L. Ties go to the alphabetically first label.
fn best_time_frame(completed: &[&TradeOutcome]) -> Option<String> {
    let mut by_frame: BTreeMap<&str, Decimal> = BTreeMap::new();
    for o in completed {
        let slot = by_frame.entry(o.setup.time_frame.as_str()).or_default();
        *slot = slot.saturating_add(o.actual_pnl.unwrap_or_default());
    }
    by_frame
        .into_iter()
        .fold(None, |best: Option<(&str, Decimal)>, (frame, pnl)| match best {
            Some((_, top)) if top >= pnl => best,
            _ => Some((frame, pnl)),
        })
        .map(|(frame, _)| frame.to_string())
}

fn monthly_returns(completed: &[&TradeOutcome]) -> Vec<MonthlyReturn> {
    let mut months: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for o in completed {
        let closed = o.exited_at.unwrap_or(o.created_at);
        let slot = months.entry(closed.format("%Y-%m").to_string()).or_default();
        slot.0 = slot.0.saturating_add(o.actual_pnl.unwrap_or_default());
        slot.1 += 1;
    }
    months
        .into_iter()
        .map(|(month, (pnl, trades))| MonthlyReturn {
            month,
            pnl: round_dp(pnl, 2),
            trades,
        })
        .collect()
}

fn saturating_sum(values: &[Decimal]) -> Decimal {
    values
        .iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
}

fn mean(total: Decimal, count: usize) -> Decimal {
    saturating_div(total, Decimal::from(count as u64))
}

fn ratio_pct(part: usize, whole: usize) -> Decimal {
    percentage_of(Decimal::from(part as u64), Decimal::from(whole as u64))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
