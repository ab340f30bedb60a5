// Presenter module: console report, JSON report and chart files.

pub mod console;
pub mod json;
pub mod svg;

use crate::model::{CorrelationMatrix, PresentError, Series, TrendLine};
use crate::utils::to_kebab_case;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Anything that can draw the run's charts.
pub trait ChartSurface {
    fn price_overlay(&self, series: &[&Series]) -> Result<(), PresentError>;
    fn return_overlay(&self, series: &[&Series]) -> Result<(), PresentError>;
    fn correlation_heatmap(&self, matrix: &CorrelationMatrix) -> Result<(), PresentError>;
    fn trend_chart(&self, series: &Series, trend: &TrendLine) -> Result<(), PresentError>;
}

/// Writes each chart as a standalone SVG file under `output_dir`.
pub struct SvgCharts {
    pub output_dir: PathBuf,
}

impl SvgCharts {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn write(&self, file_name: &str, body: &str) -> Result<(), PresentError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| PresentError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let path = self.output_dir.join(file_name);
        write_file(&path, body)?;
        info!("🖼️ [charts] Saved {}", path.display());
        Ok(())
    }
}

pub(crate) fn write_file(path: &Path, body: &str) -> Result<(), PresentError> {
    fs::write(path, body).map_err(|source| PresentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl ChartSurface for SvgCharts {
    fn price_overlay(&self, series: &[&Series]) -> Result<(), PresentError> {
        self.write("prices.svg", &svg::price_chart(series, "Stock Prices Over Time"))
    }

    fn return_overlay(&self, series: &[&Series]) -> Result<(), PresentError> {
        self.write("returns.svg", &svg::returns_chart(series, "Daily Returns"))
    }

    fn correlation_heatmap(&self, matrix: &CorrelationMatrix) -> Result<(), PresentError> {
        self.write(
            "correlation_heatmap.svg",
            &svg::heatmap(matrix, "Correlation of Daily Returns"),
        )
    }

    fn trend_chart(&self, series: &Series, trend: &TrendLine) -> Result<(), PresentError> {
        let file_name = format!("trend_{}.svg", to_kebab_case(&series.name));
        let title = format!("{} Price Trend", series.name);
        self.write(&file_name, &svg::trend_chart(series, trend, &title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricePoint;
    use chrono::NaiveDate;

    #[test]
    fn test_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let charts = SvgCharts::new(dir.path().join("out"));
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = Series::new(
            "Stock A",
            vec![
                PricePoint { date: start, price: 1.0 },
                PricePoint { date: start.succ_opt().unwrap(), price: 2.0 },
            ],
        );
        let trend = crate::analyzer::fit_trend(&series).unwrap();

        charts.price_overlay(&[&series]).unwrap();
        charts.trend_chart(&series, &trend).unwrap();

        assert!(dir.path().join("out/prices.svg").exists());
        assert!(dir.path().join("out/trend_stock-a.svg").exists());
    }
}
