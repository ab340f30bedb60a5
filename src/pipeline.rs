use crate::analyzer::{Analyzer, AnalyzerImpl, correlate, fit_trend};
use crate::config::{AppConfig, InstrumentConfig};
use crate::loader::load_series;
use crate::model::{
    AlignedPanel, AlignmentError, AnalysisError, AuxiliaryColumn, CorrelationMatrix, LoadStats,
    LoaderError, RegressionError, Series, SeriesSummary, TrendLine,
};
use crate::normalizer::ColumnNames;
use crate::presenter::ChartSurface;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Step of the per-instrument pipeline a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Analyze,
    Regress,
    Correlate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Analyze => "analysis",
            Stage::Regress => "trend fit",
            Stage::Correlate => "correlation",
        };
        f.write_str(name)
    }
}

pub(crate) fn failure_line(name: &str, stage: Stage, err: &dyn fmt::Display) -> String {
    format!("{}: {} failed: {}", name, stage, err)
}

#[derive(Debug)]
pub struct InstrumentResult {
    pub series: Series,
    pub auxiliary: Vec<AuxiliaryColumn>,
    pub stats: LoadStats,
    pub summary: Result<SeriesSummary, AnalysisError>,
    pub trend: Result<TrendLine, RegressionError>,
}

#[derive(Debug)]
pub struct InstrumentReport {
    pub name: String,
    pub source: PathBuf,
    pub outcome: Result<InstrumentResult, LoaderError>,
}

impl InstrumentReport {
    /// Readable failure lines for this instrument, one per failed stage.
    pub fn failures(&self) -> Vec<String> {
        match &self.outcome {
            Err(e) => vec![failure_line(&self.name, Stage::Load, e)],
            Ok(result) => {
                let mut out = Vec::new();
                if let Err(e) = &result.summary {
                    out.push(failure_line(&self.name, Stage::Analyze, e));
                }
                if let Err(e) = &result.trend {
                    out.push(failure_line(&self.name, Stage::Regress, e));
                }
                out
            }
        }
    }
}

#[derive(Debug)]
pub struct Correlation {
    pub panel: AlignedPanel,
    pub matrix: CorrelationMatrix,
}

#[derive(Debug)]
pub struct RunReport {
    pub instruments: Vec<InstrumentReport>,
    pub correlation: Result<Correlation, AlignmentError>,
}

impl RunReport {
    /// Series that made it through loading, in configuration order.
    pub fn loaded_series(&self) -> Vec<&Series> {
        self.instruments
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .map(|r| &r.series)
            .collect()
    }

    pub fn instrument(&self, name: &str) -> Option<&InstrumentReport> {
        self.instruments.iter().find(|r| r.name == name)
    }

    pub fn failures(&self) -> Vec<String> {
        let mut out: Vec<String> = self.instruments.iter().flat_map(|r| r.failures()).collect();
        if let Err(e) = &self.correlation {
            out.push(format!("{} failed: {}", Stage::Correlate, e));
        }
        out
    }
}

fn process_instrument(
    instrument: &InstrumentConfig,
    columns: &ColumnNames<'_>,
    analyzer: &dyn Analyzer,
) -> InstrumentReport {
    info!("🔍 [pipeline] Processing instrument: {}", instrument.name);
    let outcome = load_series(&instrument.name, &instrument.path, columns).map(|loaded| {
        let mut series = loaded.series;
        analyzer.enrich(&mut series);
        let summary = analyzer.summarize(&series);
        let trend = fit_trend(&series);
        InstrumentResult {
            series,
            auxiliary: loaded.auxiliary,
            stats: loaded.stats,
            summary,
            trend,
        }
    });

    let report = InstrumentReport {
        name: instrument.name.clone(),
        source: instrument.path.clone(),
        outcome,
    };
    for failure in report.failures() {
        warn!("❌ [pipeline] {}", failure);
    }
    report
}

/// Loads, analyzes and correlates every configured instrument. A failing
/// instrument is recorded in the report and the rest keep going.
pub fn run_with(
    config: &AppConfig,
    analyzer: &dyn Analyzer,
    charts: Option<&dyn ChartSurface>,
) -> RunReport {
    let columns = ColumnNames {
        date: &config.date_column,
        price: &config.price_column,
    };

    let instruments: Vec<InstrumentReport> = config
        .instruments
        .iter()
        .map(|instrument| process_instrument(instrument, &columns, analyzer))
        .collect();

    let loaded: Vec<Series> = instruments
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok())
        .map(|r| r.series.clone())
        .collect();
    info!("📊 [pipeline] Correlating {} instruments", loaded.len());
    let correlation = correlate(&loaded).map(|(panel, matrix)| Correlation { panel, matrix });
    if let Err(e) = &correlation {
        warn!("⚠️ [pipeline] Correlation skipped: {}", e);
    }

    let report = RunReport {
        instruments,
        correlation,
    };

    if let Some(charts) = charts {
        render_charts(&report, charts);
    }
    report
}

pub fn run(config: &AppConfig, charts: Option<&dyn ChartSurface>) -> RunReport {
    let analyzer = AnalyzerImpl::new(config.short_window, config.long_window);
    run_with(config, &analyzer, charts)
}

fn render_charts(report: &RunReport, charts: &dyn ChartSurface) {
    let series = report.loaded_series();
    if series.is_empty() {
        info!("[charts] Nothing to draw");
        return;
    }
    if let Err(e) = charts.price_overlay(&series) {
        warn!("❌ [charts] Price chart failed: {}", e);
    }
    if let Err(e) = charts.return_overlay(&series) {
        warn!("❌ [charts] Returns chart failed: {}", e);
    }
    if let Ok(correlation) = &report.correlation {
        if let Err(e) = charts.correlation_heatmap(&correlation.matrix) {
            warn!("❌ [charts] Heatmap failed: {}", e);
        }
    }
    for result in report.instruments.iter().filter_map(|r| r.outcome.as_ref().ok()) {
        if let Ok(trend) = &result.trend {
            if let Err(e) = charts.trend_chart(&result.series, trend) {
                warn!("❌ [charts] Trend chart for {} failed: {}", result.series.name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_lines_name_instrument_and_stage() {
        let report = InstrumentReport {
            name: "Stock B".into(),
            source: PathBuf::from("missing.csv"),
            outcome: Err(LoaderError::UnreadableSource {
                path: PathBuf::from("missing.csv"),
                reason: "No such file".into(),
            }),
        };
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Stock B: load failed:"));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Regress.to_string(), "trend fit");
        assert_eq!(Stage::Correlate.to_string(), "correlation");
    }
}
