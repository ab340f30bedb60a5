use super::{RawCell, RawTable, TableReader};
use crate::model::LoaderError;
use csv::ReaderBuilder;
use std::path::Path;

/// Delimited-text reader. Every field is kept as text; coercion happens later.
pub struct CsvReader {
    delimiter: u8,
}

impl CsvReader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TableReader for CsvReader {
    fn read_table(&self, path: &Path) -> Result<RawTable, LoaderError> {
        let unreadable = |e: csv::Error| LoaderError::UnreadableSource {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(unreadable)?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(unreadable)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(unreadable)?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            RawCell::Empty
                        } else {
                            RawCell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(RawTable { headers, rows })
    }
}
