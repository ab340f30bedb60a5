use crate::pipeline::{RunReport, Stage, failure_line};
use std::fmt;

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instrument in &self.instruments {
            writeln!(f)?;
            let result = match &instrument.outcome {
                Ok(result) => result,
                Err(e) => {
                    writeln!(f, "❌ {}", failure_line(&instrument.name, Stage::Load, e))?;
                    continue;
                }
            };
            match &result.summary {
                Ok(summary) => writeln!(f, "{}", summary)?,
                Err(e) => {
                    writeln!(f, "----- {} Analysis -----", instrument.name)?;
                    writeln!(f, "❌ {}", failure_line(&instrument.name, Stage::Analyze, e))?;
                }
            }
            match &result.trend {
                Ok(trend) => writeln!(
                    f,
                    "Trend: {:+.4} per day (intercept {:.2}, {} points)",
                    trend.slope_per_day, trend.intercept, trend.points_used
                )?,
                Err(e) => {
                    writeln!(f, "❌ {}", failure_line(&instrument.name, Stage::Regress, e))?
                }
            }
        }

        writeln!(f)?;
        match &self.correlation {
            Ok(correlation) => {
                writeln!(f, "📊 Correlation Matrix:")?;
                writeln!(f, "{}", correlation.matrix)
            }
            Err(e) => writeln!(f, "❌ {} failed: {}", Stage::Correlate, e),
        }
    }
}

/// Renders the run as the plain-text report printed to stdout.
pub fn render_report(report: &RunReport) -> String {
    report.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlignmentError, LoaderError};
    use crate::pipeline::InstrumentReport;
    use std::path::PathBuf;

    #[test]
    fn test_failures_render_with_stage() {
        let report = RunReport {
            instruments: vec![InstrumentReport {
                name: "Stock D".into(),
                source: PathBuf::from("missing.csv"),
                outcome: Err(LoaderError::UnreadableSource {
                    path: PathBuf::from("missing.csv"),
                    reason: "No such file".into(),
                }),
            }],
            correlation: Err(AlignmentError::InsufficientData { found: 0 }),
        };

        let text = render_report(&report);
        assert!(text.contains("❌ Stock D: load failed: cannot read source missing.csv"));
        assert!(text.contains("❌ correlation failed: correlation needs at least 2"));
        assert!(!text.contains("📊 Correlation Matrix:"));
    }
}
