use rust_decimal::Decimal;

use crate::models::{percentage_of, round_dp, saturating_div, RiskMetrics, TradeSetup};

/// Ratio below which a setup is flagged (but still tradable).
pub const MIN_RISK_REWARD_RATIO: Decimal = Decimal::from_parts(15, 0, 0, false, 1); // 1.5
/// Stop-loss distance (% of entry) above which the loss is flagged.
pub const MAX_ACCEPTABLE_LOSS_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
/// Profit target (% of entry) below which costs may eat the trade.
pub const MIN_PROFIT_TARGET_PCT: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Derive risk/reward figures for a long setup.
///
/// Expects validated input (see [`super::input::validate_trade_setup`]); a
/// zero stop distance yields a zero ratio rather than a division panic, and
/// figures too large for `Decimal` saturate at its bounds.
pub fn calculate_risk_metrics(setup: &TradeSetup) -> RiskMetrics {
    let potential_profit = setup.take_profit_price.saturating_sub(setup.entry_price);
    let potential_loss = setup.entry_price.saturating_sub(setup.stop_loss_price);

    let profit_percentage = percentage_of(potential_profit, setup.entry_price);
    let loss_percentage = percentage_of(potential_loss, setup.entry_price);

    let risk_reward_ratio = saturating_div(potential_profit, potential_loss);

    let mut warnings = Vec::new();

    if risk_reward_ratio < MIN_RISK_REWARD_RATIO {
        warnings.push(format!(
            "Risk-reward ratio below {MIN_RISK_REWARD_RATIO}:1 is generally not recommended"
        ));
    }
    if risk_reward_ratio < Decimal::ONE {
        warnings.push("Risk is greater than potential reward - high risk setup".into());
    }
    if loss_percentage > MAX_ACCEPTABLE_LOSS_PCT {
        warnings.push(format!(
            "Stop loss represents more than {MAX_ACCEPTABLE_LOSS_PCT}% loss - consider tighter risk management"
        ));
    }
    if profit_percentage < MIN_PROFIT_TARGET_PCT {
        warnings.push(format!(
            "Profit target less than {MIN_PROFIT_TARGET_PCT}% - may not justify transaction costs"
        ));
    }

    let is_valid_setup = risk_reward_ratio >= Decimal::ONE
        && potential_profit > Decimal::ZERO
        && potential_loss > Decimal::ZERO;

    tracing::debug!(
        pair = %setup.trading_pair,
        ratio = %risk_reward_ratio,
        valid = is_valid_setup,
        warnings = warnings.len(),
        "Risk metrics calculated"
    );

    RiskMetrics {
        risk_reward_ratio: round_dp(risk_reward_ratio, 2),
        potential_profit: round_dp(potential_profit, 2),
        potential_loss: round_dp(potential_loss, 2),
        profit_percentage: round_dp(profit_percentage, 2),
        loss_percentage: round_dp(loss_percentage, 2),
        is_valid_setup,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(entry: i64, tp: i64, sl: i64) -> TradeSetup {
        TradeSetup {
            trading_pair: "BTC/USDT".into(),
            entry_price: Decimal::from(entry),
            entry_reasoning: String::new(),
            take_profit_price: Decimal::from(tp),
            take_profit_reasoning: String::new(),
            stop_loss_price: Decimal::from(sl),
            stop_loss_reasoning: String::new(),
            position_size: Decimal::from(100),
            time_frame: "swing".into(),
            leverage: Decimal::ONE,
        }
    }

    #[test]
    fn test_basic_ratio() {
        let m = calculate_risk_metrics(&setup(100, 110, 95));
        assert_eq!(m.risk_reward_ratio, Decimal::from(2));
        assert_eq!(m.potential_profit, Decimal::from(10));
        assert_eq!(m.potential_loss, Decimal::from(5));
        assert_eq!(m.profit_percentage, Decimal::from(10));
        assert_eq!(m.loss_percentage, Decimal::from(5));
        assert!(m.is_valid_setup);
        assert!(m.warnings.is_empty());
    }

    #[test]
    fn test_ratio_rounds_half_away_from_zero() {
        // 10 / 3 = 3.333.. → 3.33
        let m = calculate_risk_metrics(&setup(100, 110, 97));
        assert_eq!(m.risk_reward_ratio, Decimal::new(333, 2));

        let mut s = setup(100, 0, 0);
        s.take_profit_price = Decimal::new(100_125, 3); // +0.125
        s.stop_loss_price = Decimal::new(99_900, 3); // -0.1
        let m = calculate_risk_metrics(&s);
        assert_eq!(m.risk_reward_ratio, Decimal::new(125, 2));
        // 0.125 is a midpoint: rounds up, not to even
        assert_eq!(m.potential_profit, Decimal::new(13, 2));
    }

    #[test]
    fn test_all_warnings_fire_independently() {
        // profit 2%, loss 8% → ratio 0.25
        let m = calculate_risk_metrics(&setup(100, 102, 92));
        assert_eq!(m.warnings.len(), 4);
        assert!(!m.is_valid_setup);
    }

    #[test]
    fn test_marginal_ratio_only_warns_once() {
        // ratio 1.2: below 1.5 but not below 1
        let m = calculate_risk_metrics(&setup(100, 106, 95));
        assert_eq!(m.risk_reward_ratio, Decimal::new(12, 1));
        assert!(m.is_valid_setup);
        assert_eq!(m.warnings.len(), 1);
    }

    #[test]
    fn test_zero_stop_distance_is_invalid() {
        let m = calculate_risk_metrics(&setup(100, 110, 100));
        assert_eq!(m.risk_reward_ratio, Decimal::ZERO);
        assert!(!m.is_valid_setup);
    }

    #[test]
    fn test_sub_cent_entry_with_huge_target_saturates() {
        let mut s = setup(1, 1, 1);
        s.entry_price = Decimal::new(1, 11);
        s.take_profit_price = Decimal::from(1_000_000_000_000_000_000i64);
        s.stop_loss_price = Decimal::new(99, 13);

        let m = calculate_risk_metrics(&s);
        assert_eq!(m.profit_percentage, Decimal::MAX);
        assert_eq!(m.risk_reward_ratio, Decimal::MAX);
        assert_eq!(m.loss_percentage, Decimal::ONE);
        assert!(m.is_valid_setup);
        assert!(m.warnings.is_empty());
    }
}
