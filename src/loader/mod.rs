// Loader module: reads tabular sources and hands them to the normalizer.

pub mod csv_reader;
pub mod xlsx_reader;

pub use csv_reader::CsvReader;
pub use xlsx_reader::XlsxReader;

use crate::model::{LoadedSeries, LoaderError, Series};
use crate::normalizer::{ColumnNames, normalize_table};
use chrono::NaiveDate;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// A single cell as the container format delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Text(text) => f.write_str(text),
            RawCell::Number(value) => write!(f, "{}", value),
            RawCell::Date(date) => write!(f, "{}", date),
            RawCell::Empty => Ok(()),
        }
    }
}

/// Header row plus data rows, before any coercion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

/// Trait for a container format that can be read into a raw table.
pub trait TableReader {
    fn read_table(&self, path: &Path) -> Result<RawTable, LoaderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited(u8),
    Spreadsheet,
}

impl SourceFormat {
    /// Delimited text for csv/tsv/txt extensions, spreadsheet for anything else.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") | Some("txt") => SourceFormat::Delimited(b','),
            Some("tsv") => SourceFormat::Delimited(b'\t'),
            _ => SourceFormat::Spreadsheet,
        }
    }
}

/// Reads `path` in the format implied by its extension and returns the
/// cleaned series named `name`.
pub fn load_series(
    name: &str,
    path: &Path,
    columns: &ColumnNames<'_>,
) -> Result<LoadedSeries, LoaderError> {
    let format = SourceFormat::from_path(path);
    debug!("[loader] {} → {:?}", path.display(), format);
    let table = match format {
        SourceFormat::Delimited(delimiter) => CsvReader::new(delimiter).read_table(path)?,
        SourceFormat::Spreadsheet => XlsxReader::new().read_table(path)?,
    };
    let normalized = normalize_table(table, columns, path)?;
    info!(
        "📥 [loader] {}: kept {} of {} rows ({} bad price, {} bad date)",
        name,
        normalized.stats.rows_kept(),
        normalized.stats.rows_read,
        normalized.stats.dropped_price,
        normalized.stats.dropped_date
    );
    Ok(LoadedSeries {
        series: Series::new(name, normalized.points),
        auxiliary: normalized.auxiliary,
        stats: normalized.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        let format_of = |name: &str| SourceFormat::from_path(Path::new(name));
        assert_eq!(format_of("a.csv"), SourceFormat::Delimited(b','));
        assert_eq!(format_of("a.CSV"), SourceFormat::Delimited(b','));
        assert_eq!(format_of("a.tsv"), SourceFormat::Delimited(b'\t'));
        assert_eq!(format_of("a.xlsx"), SourceFormat::Spreadsheet);
        assert_eq!(format_of("prices"), SourceFormat::Spreadsheet);
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let columns = ColumnNames {
            date: "Date",
            price: "Price",
        };
        let err = load_series("X", Path::new("/not/here.csv"), &columns).unwrap_err();
        assert!(matches!(err, LoaderError::UnreadableSource { .. }));
        let err = load_series("X", Path::new("/not/here.xlsx"), &columns).unwrap_err();
        assert!(matches!(err, LoaderError::UnreadableSource { .. }));
    }
}
