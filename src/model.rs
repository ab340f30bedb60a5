// Core structs: PricePoint, Series, summaries and the error taxonomy
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Columns the analyzer attaches to a series. Every vector is index-aligned
/// with `Series::points`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedColumns {
    pub period_return: Vec<Option<f64>>,
    pub short_window: usize,
    pub short_mean: Vec<Option<f64>>,
    pub long_window: usize,
    pub long_mean: Vec<Option<f64>>,
}

/// Cleaned, time-ordered price history for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<PricePoint>,
    pub derived: Option<DerivedColumns>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            name: name.into(),
            points,
            derived: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}

/// A raw, non date/price column carried through the loader untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuxiliaryColumn {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub dropped_price: usize,
    pub dropped_date: usize,
}

impl LoadStats {
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.dropped_price - self.dropped_date
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries {
    pub series: Series,
    pub auxiliary: Vec<AuxiliaryColumn>,
    pub stats: LoadStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observations: usize,
    pub total_return_pct: f64,
    /// `None` when fewer than two period returns exist.
    pub volatility_pct: Option<f64>,
}

/// Least-squares line of price against days elapsed since `start.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope_per_day: f64,
    pub intercept: f64,
    pub points_used: usize,
    pub start: (NaiveDate, f64),
    pub end: (NaiveDate, f64),
}

/// Several series reindexed onto one shared date axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPanel {
    pub dates: Vec<NaiveDate>,
    pub names: Vec<String>,
    /// One column per instrument, each `dates.len()` long.
    pub columns: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("cannot read source {}: {reason}", .path.display())]
    UnreadableSource { path: PathBuf, reason: String },
    #[error("column '{column}' not found in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("series '{0}' has no rows")]
    EmptySeries(String),
    #[error("series '{0}' starts at a price of zero")]
    ZeroBasePrice(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum AlignmentError {
    #[error("correlation needs at least 2 instruments, got {found}")]
    InsufficientData { found: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum RegressionError {
    #[error("trend fit for '{name}' needs at least 2 points, got {found}")]
    InsufficientPoints { name: String, found: usize },
    #[error("trend fit for '{name}' has all points on a single date")]
    ZeroTimeSpan { name: String },
}

#[derive(Debug, Error)]
pub enum PresentError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
