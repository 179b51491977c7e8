pub mod pattern;
pub mod rolling;
pub mod trend;

pub use pattern::{find_patterns, PatternAnalyzer, PatternMatch};
pub use rolling::RollingState;
pub use trend::{TrendAnalyzer, TrendSnapshot};
