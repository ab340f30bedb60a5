use super::{RawCell, RawTable, TableReader};
use crate::model::LoaderError;
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

/// Spreadsheet reader over the first worksheet of any workbook calamine opens.
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XlsxReader {
    fn default() -> Self {
        Self::new()
    }
}

fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::String(s) if s.trim().is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| RawCell::Date(d.date()))
            .unwrap_or(RawCell::Empty),
        Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        _ => RawCell::Empty,
    }
}

impl TableReader for XlsxReader {
    fn read_table(&self, path: &Path) -> Result<RawTable, LoaderError> {
        let unreadable = |reason: String| LoaderError::UnreadableSource {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| unreadable("workbook has no worksheets".into()))?
            .map_err(|e| unreadable(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|c| to_raw_cell(c).to_string())
                .collect(),
            None => return Ok(RawTable::default()),
        };
        let rows = rows.map(|row| row.iter().map(to_raw_cell).collect()).collect();

        Ok(RawTable { headers, rows })
    }
}
