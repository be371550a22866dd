pub mod behavior;
pub mod exchanges;
pub mod flows;
pub mod prediction;
pub mod thresholds;
pub mod tiers;

pub use behavior::{analyze_whale_behavior, analyze_whale_behavior_at, analyze_whale_behavior_with};
pub use exchanges::is_exchange_address;
pub use flows::build_onchain_insights;
pub use prediction::{predict_from_whale_activity, predict_from_whale_activity_with};
pub use thresholds::IntelligenceConfig;
pub use tiers::{classify_whale_tiers, classify_whale_tiers_with, gini_coefficient};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntelligenceError {
    #[error("holder list is not sorted by descending balance (first violation at index {index})")]
    UnsortedHolders { index: usize },
}
