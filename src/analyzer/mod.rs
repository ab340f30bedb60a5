// Analyzer module: aggregates submodules for different aspects of analysis.

pub mod alignment;
pub mod market_indicators;
pub mod price_analysis;
pub mod regression;

// Re-export the main Analyzer implementation for ease of use.
pub use alignment::{align, correlate};
pub use price_analysis::{Analyzer, AnalyzerImpl};
pub use regression::fit_trend;
