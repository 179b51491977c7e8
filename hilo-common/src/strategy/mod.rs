pub mod base;
mod ma_crossover;
mod pattern_break;
mod trend_reversal;
mod volatility;

pub use base::{fallback, random_category, AnalysisContext, Signal, Strategy};
pub use ma_crossover::MaCrossoverStrategy;
pub use pattern_break::PatternBreakStrategy;
pub use trend_reversal::{TrendReversalStrategy, REVERSAL_MOMENTUM};
pub use volatility::{VolatilityStrategy, COUNTER_TREND_VOLATILITY};

#[derive(Debug, Clone)]
pub struct StrategyInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

pub fn create_strategy(strategy_id: &str) -> Result<Box<dyn Strategy>, String> {
    match strategy_id {
        "pattern_break" => Ok(Box::new(PatternBreakStrategy)),
        "trend_reversal" => Ok(Box::new(TrendReversalStrategy)),
        "volatility" => Ok(Box::new(VolatilityStrategy)),
        "ma_crossover" => Ok(Box::new(MaCrossoverStrategy)),
        _ => Err(format!("Unknown strategy: {}", strategy_id)),
    }
}

/// Every registered strategy, in registry order. This is the defensive vote.
pub fn ensemble() -> Vec<Box<dyn Strategy>> {
    list_strategies()
        .iter()
        .filter_map(|info| create_strategy(&info.id).ok())
        .collect()
}

pub fn list_strategies() -> Vec<StrategyInfo> {
    vec![
        StrategyInfo {
            id: "pattern_break".to_string(),
            name: "Pattern Break".to_string(),
            description: "Predicts the opposite of the continuation implied by the most frequent recurring pattern"
                .to_string(),
        },
        StrategyInfo {
            id: "trend_reversal".to_string(),
            name: "Trend Reversal".to_string(),
            description: "Predicts a reversal after a five-sample move larger than 2".to_string(),
        },
        StrategyInfo {
            id: "volatility".to_string(),
            name: "Volatility".to_string(),
            description: "Goes against the last category in volatile windows, with it otherwise"
                .to_string(),
        },
        StrategyInfo {
            id: "ma_crossover".to_string(),
            name: "Moving Average Crossover".to_string(),
            description: "Follows the direction of a strictly ordered 5/10/20 moving-average stack"
                .to_string(),
        },
    ]
}

pub fn get_strategy_info(strategy_id: &str) -> Option<StrategyInfo> {
    list_strategies()
        .into_iter()
        .find(|info| info.id == strategy_id)
}
