use super::write_file;
use crate::model::{CorrelationMatrix, LoadStats, PresentError, SeriesSummary, TrendLine};
use crate::pipeline::RunReport;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct InstrumentEntry<'a> {
    pub name: &'a str,
    pub source: &'a Path,
    pub load_error: Option<String>,
    pub load_stats: Option<LoadStats>,
    pub auxiliary_columns: Vec<&'a str>,
    pub summary: Option<&'a SeriesSummary>,
    pub summary_error: Option<String>,
    pub trend: Option<&'a TrendLine>,
    pub trend_error: Option<String>,
}

/// Serializable view of a run; errors are flattened to their messages.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub instruments: Vec<InstrumentEntry<'a>>,
    pub correlation: Option<&'a CorrelationMatrix>,
    pub correlation_error: Option<String>,
}

impl<'a> ReportDocument<'a> {
    pub fn from_report(report: &'a RunReport) -> Self {
        let instruments = report
            .instruments
            .iter()
            .map(|r| match &r.outcome {
                Err(e) => InstrumentEntry {
                    name: &r.name,
                    source: &r.source,
                    load_error: Some(e.to_string()),
                    load_stats: None,
                    auxiliary_columns: Vec::new(),
                    summary: None,
                    summary_error: None,
                    trend: None,
                    trend_error: None,
                },
                Ok(result) => InstrumentEntry {
                    name: &r.name,
                    source: &r.source,
                    load_error: None,
                    load_stats: Some(result.stats),
                    auxiliary_columns: result.auxiliary.iter().map(|c| c.name.as_str()).collect(),
                    summary: result.summary.as_ref().ok(),
                    summary_error: result.summary.as_ref().err().map(|e| e.to_string()),
                    trend: result.trend.as_ref().ok(),
                    trend_error: result.trend.as_ref().err().map(|e| e.to_string()),
                },
            })
            .collect();

        Self {
            instruments,
            correlation: report.correlation.as_ref().ok().map(|c| &c.matrix),
            correlation_error: report.correlation.as_ref().err().map(|e| e.to_string()),
        }
    }
}

pub fn to_json(report: &RunReport) -> Result<String, PresentError> {
    Ok(serde_json::to_string_pretty(&ReportDocument::from_report(report))?)
}

pub fn write_report(report: &RunReport, path: &Path) -> Result<PathBuf, PresentError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PresentError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_file(path, &to_json(report)?)?;
    info!("📝 [report] Saved {}", path.display());
    Ok(path.to_path_buf())
}
