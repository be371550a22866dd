pub mod onchain;
pub mod outcome;
pub mod trade;
pub mod whale;

pub use onchain::{
    LargeTransfer, LiquidityIndicators, OnchainInsights, OnchainSummary, TopHolder,
    TransferDirection, VolumeAnalysis, WhaleActivity,
};
pub use outcome::{
    ExitReason, OutcomeStatus, PredictionAccuracy, RealizedMetrics, TradeOutcome,
};
pub use trade::{PositionSize, Recommendation, RiskMetrics, TradeAnalysis, TradeSetup};
pub use whale::{
    ActionRecommendation, ConcentrationStats, HolderRecord, ImpactMagnitude, ImpactTimeframe,
    PressureMetrics, PriceDirection, PriceImpact, RecentActivity, RiskLevel, SortedHolders,
    TransferRecord, WhaleAction, WhaleBehaviorPattern, WhaleHolder, WhalePrediction, WhaleTier,
    WhaleTierAnalysis,
};

use rust_decimal::{Decimal, RoundingStrategy};

/// Round half away from zero, the way prices and percentages are shown to traders.
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `value / base × 100`, or zero when `base` is zero. Saturates at the
/// `Decimal` bounds instead of overflowing.
pub fn percentage_of(value: Decimal, base: Decimal) -> Decimal {
    saturating_div(value, base).saturating_mul(Decimal::ONE_HUNDRED)
}

/// `value / divisor`, zero when `divisor` is zero, clamped to `Decimal::MAX`
/// or `Decimal::MIN` when the quotient is out of range.
pub fn saturating_div(value: Decimal, divisor: Decimal) -> Decimal {
    if divisor.is_zero() {
        return Decimal::ZERO;
    }
    value.checked_div(divisor).unwrap_or_else(|| {
        if value.is_sign_negative() != divisor.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// A total of raw token amounts that stays inside the `Decimal` range.
///
/// When the plain sum overflows every amount is divided by the number of
/// terms first, so `sum` is the mean rather than the total and `scale` is
/// the term count. Shares computed through `share_pct` are unaffected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledSum {
    pub sum: Decimal,
    pub scale: Decimal,
}

impl ScaledSum {
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
        I::IntoIter: Clone,
    {
        let values = values.into_iter();
        let plain = values
            .clone()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v));
        if let Some(sum) = plain {
            return Self {
                sum,
                scale: Decimal::ONE,
            };
        }

        let scale = Decimal::from(values.clone().count());
        let sum = values.fold(Decimal::ZERO, |acc, v| {
            acc.saturating_add(saturating_div(v, scale))
        });
        Self { sum, scale }
    }

    /// Bring a raw amount into the same units as `sum`.
    pub fn scale_down(&self, value: Decimal) -> Decimal {
        saturating_div(value, self.scale)
    }

    /// `value` as a percentage of the total.
    pub fn share_pct(&self, value: Decimal) -> Decimal {
        percentage_of(self.scale_down(value), self.sum)
    }

    /// The real total, clamped to `Decimal::MAX` when it cannot be represented.
    pub fn total(&self) -> Decimal {
        self.sum.saturating_mul(self.scale)
    }

    pub fn is_scaled(&self) -> bool {
        self.scale != Decimal::ONE
    }
}
