use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PositionSize, TradeSetup};

/// Boundary check failed before the setup reached the scoring core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TradeSetupError {
    #[error("invalid trade setup: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Check every field the scoring core assumes is sane. All problems are
/// reported together, not just the first one.
pub fn validate_trade_setup(setup: &TradeSetup) -> Result<(), TradeSetupError> {
    let mut errors = Vec::new();

    require_text(&mut errors, &setup.trading_pair, "Trading pair");

    require_positive(&mut errors, setup.entry_price, "Entry price");
    require_positive(&mut errors, setup.take_profit_price, "Take profit price");
    require_positive(&mut errors, setup.stop_loss_price, "Stop loss price");

    // Long-only: TP above entry, SL below entry
    if setup.entry_price > Decimal::ZERO
        && setup.take_profit_price > Decimal::ZERO
        && setup.stop_loss_price > Decimal::ZERO
    {
        if setup.take_profit_price <= setup.entry_price {
            errors.push("Take profit must be higher than entry price for long positions".into());
        }
        if setup.stop_loss_price >= setup.entry_price {
            errors.push("Stop loss must be lower than entry price for long positions".into());
        }
    }

    require_text(&mut errors, &setup.entry_reasoning, "Entry reasoning");
    require_text(&mut errors, &setup.take_profit_reasoning, "Take profit reasoning");
    require_text(&mut errors, &setup.stop_loss_reasoning, "Stop loss reasoning");

    require_positive(&mut errors, setup.position_size, "Position size");
    require_text(&mut errors, &setup.time_frame, "Time frame");
    require_positive(&mut errors, setup.leverage, "Leverage");

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TradeSetupError::Invalid(errors))
    }
}

fn require_positive(errors: &mut Vec<String>, value: Decimal, field: &str) {
    if value <= Decimal::ZERO {
        errors.push(format!("{field} must be greater than 0"));
    }
}

fn require_text(errors: &mut Vec<String>, value: &str, field: &str) {
    if value.trim().is_empty() {
        errors.push(format!("{field} is required"));
    }
}

// ---------------------------------------------------------------------------
// Free-text parsing
// ---------------------------------------------------------------------------

/// Parse a leverage label such as `"5x"`, `"custom-12.5x"` or `"none"`.
/// Anything unrecognised is treated as no leverage.
pub fn parse_leverage(label: &str) -> Decimal {
    let cleaned = label.trim().to_lowercase();

    if cleaned == "none" || cleaned == "no leverage (1x)" {
        return Decimal::ONE;
    }

    number_before_x(&cleaned).unwrap_or(Decimal::ONE)
}

/// First `<digits>[.<digits>]x` occurrence in `s`.
fn number_before_x(s: &str) -> Option<Decimal> {
    let bytes = s.as_bytes();
    let mut start = None;

    for (i, &b) in bytes.iter().enumerate() {
        match (start, b) {
            (None, b'0'..=b'9') => start = Some(i),
            (Some(_), b'0'..=b'9' | b'.') => {}
            (Some(st), b'x') => {
                if let Ok(value) = s[st..i].trim_end_matches('.').parse::<Decimal>() {
                    return Some(value);
                }
                start = None;
            }
            (Some(_), _) => start = None,
            _ => {}
        }
    }

    None
}

/// Parse a position size typed as `"2%"`, `"$500"`, `"500 usd"` or a bare number.
pub fn parse_position_size(raw: &str) -> PositionSize {
    let cleaned = raw.trim().to_lowercase();

    if cleaned.contains('%') {
        let value = cleaned.replace('%', "").trim().parse().unwrap_or(Decimal::ZERO);
        return PositionSize::Percentage(value);
    }

    if cleaned.contains('$') || cleaned.contains("usd") {
        let digits: String = cleaned
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | 'u' | 's' | 'd'))
            .collect();
        let value = digits.trim().parse().unwrap_or(Decimal::ZERO);
        return PositionSize::Dollar(value);
    }

    match cleaned.parse::<Decimal>() {
        Ok(value) => PositionSize::Dollar(value),
        Err(_) => PositionSize::Invalid,
    }
}

// ---------------------------------------------------------------------------
// Time frame
// ---------------------------------------------------------------------------

/// Holding-period risk bucket derived from a free-text time frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrameRisk {
    /// Minute-scale / scalping.
    High,
    /// Hour-scale / day trading.
    Medium,
    /// Swing and longer.
    Low,
}

const SCALPING_TOKENS: &[&str] = &["scalping", "scalp"];
const DAY_TRADING_TOKENS: &[&str] = &["daytrading", "intraday"];

/// Candle intervals shorter than this are scalping.
const SCALPING_MAX_MINUTES: u32 = 30;
/// Intraday intervals stop short of a daily candle.
const DAY_TRADING_MAX_MINUTES: u32 = 24 * 60;

impl TimeFrameRisk {
    pub fn classify(time_frame: &str) -> Self {
        let cleaned = time_frame.trim().to_lowercase();
        let tokens: Vec<&str> = cleaned
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let has_any = |list: &[&str]| tokens.iter().any(|t| list.contains(t));
        let shortest = tokens.iter().filter_map(|t| interval_minutes(t)).min();

        if has_any(SCALPING_TOKENS) || shortest.is_some_and(|m| m < SCALPING_MAX_MINUTES) {
            TimeFrameRisk::High
        } else if cleaned.contains("day-trading")
            || cleaned.contains("day trading")
            || has_any(DAY_TRADING_TOKENS)
            || shortest.is_some_and(|m| m < DAY_TRADING_MAX_MINUTES)
        {
            TimeFrameRisk::Medium
        } else {
            TimeFrameRisk::Low
        }
    }
}

/// Length of a candle-interval token such as `3m`, `45min` or `4h`, in minutes.
fn interval_minutes(token: &str) -> Option<u32> {
    let split = token.find(|c: char| !c.is_ascii_digit())?;
    let (digits, unit) = token.split_at(split);
    let n: u32 = digits.parse().ok()?;
    match unit {
        "m" | "min" | "mins" => Some(n),
        "h" | "hr" | "hrs" => n.checked_mul(60),
        _ => None,
    }
}
