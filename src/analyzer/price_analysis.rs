use crate::analyzer::market_indicators::MarketIndicators;
use crate::model::{AnalysisError, DerivedColumns, Series, SeriesSummary};
use std::fmt;

/// Trading-day factor used by the volatility estimate.
pub const TRADING_DAYS: f64 = 252.0;

/// Volatility is reported as `std(returns) * 100 * 252 * 0.5`. This is a
/// fixed linear scaling carried over from existing reports, not the usual
/// `sqrt(252)` annualization; keep it as is so numbers stay comparable.
pub const VOLATILITY_SCALE: f64 = 100.0 * TRADING_DAYS * 0.5;

/// Trait defining the interface for a price series analyzer.
pub trait Analyzer {
    /// Attaches period returns and rolling means to the series.
    fn enrich(&self, series: &mut Series);
    fn summarize(&self, series: &Series) -> Result<SeriesSummary, AnalysisError>;
}

/// Implementation of the price series analyzer.
pub struct AnalyzerImpl {
    pub short_window: usize,
    pub long_window: usize,
}

impl AnalyzerImpl {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new(50, 200)
    }
}

impl Analyzer for AnalyzerImpl {
    fn enrich(&self, series: &mut Series) {
        let prices = series.prices();
        let as_options: Vec<Option<f64>> = prices.iter().copied().map(Some).collect();
        series.derived = Some(DerivedColumns {
            period_return: MarketIndicators::period_returns(&as_options),
            short_window: self.short_window,
            short_mean: MarketIndicators::rolling_mean(&prices, self.short_window),
            long_window: self.long_window,
            long_mean: MarketIndicators::rolling_mean(&prices, self.long_window),
        });
    }

    /// Total return over first and last rows, plus the volatility estimate.
    /// Uses the attached returns when present and recomputes them otherwise.
    fn summarize(&self, series: &Series) -> Result<SeriesSummary, AnalysisError> {
        let (first, last) = match (series.points.first(), series.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AnalysisError::EmptySeries(series.name.clone())),
        };
        if first.price == 0.0 {
            return Err(AnalysisError::ZeroBasePrice(series.name.clone()));
        }

        let returns: Vec<f64> = match &series.derived {
            Some(derived) => derived.period_return.iter().flatten().copied().collect(),
            None => {
                let prices: Vec<Option<f64>> =
                    series.points.iter().map(|p| Some(p.price)).collect();
                MarketIndicators::period_returns(&prices).into_iter().flatten().collect()
            }
        };

        Ok(SeriesSummary {
            name: series.name.clone(),
            start_date: first.date,
            end_date: last.date,
            observations: series.len(),
            total_return_pct: (last.price / first.price - 1.0) * 100.0,
            volatility_pct: MarketIndicators::sample_std_dev(&returns)
                .map(|sd| sd * VOLATILITY_SCALE),
        })
    }
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----- {} Analysis -----", self.name)?;
        writeln!(f, "Total Period: {} → {}", self.start_date, self.end_date)?;
        writeln!(f, "Total Return: {:.2}%", self.total_return_pct)?;
        match self.volatility_pct {
            Some(vol) => write!(f, "Average Annual Volatility: {:.2}%", vol),
            None => write!(f, "Average Annual Volatility: n/a"),
        }
    }
}
