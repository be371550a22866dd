pub mod input;
pub mod onchain;
pub mod performance;
pub mod recommendation;
pub mod risk_metrics;

pub use input::{
    parse_leverage, parse_position_size, validate_trade_setup, TimeFrameRisk, TradeSetupError,
};
pub use onchain::{
    calculate_onchain_adjustment, format_currency, summarize_onchain, CurrencyUnit,
    OnchainAdjustment,
};
pub use performance::{
    performance_metrics, MonthlyReturn, OutcomeError, PerformanceMetrics,
};
pub use recommendation::{assess_reasoning_quality, generate_recommendation, ReasoningQuality};
pub use risk_metrics::calculate_risk_metrics;
