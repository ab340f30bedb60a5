use crate::loader::{RawCell, RawTable};
use crate::model::{AuxiliaryColumn, LoadStats, LoaderError, PricePoint};
use crate::utils::parse_date;
use chrono::NaiveDate;
use std::path::Path;

/// Characters removed from price text before numeric coercion.
pub const STRIPPED_PRICE_CHARS: &[char] = &[',', '₹'];

static EMPTY_CELL: RawCell = RawCell::Empty;

pub struct ColumnNames<'a> {
    pub date: &'a str,
    pub price: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub points: Vec<PricePoint>,
    pub auxiliary: Vec<AuxiliaryColumn>,
    pub stats: LoadStats,
}

/// Strips separators and currency symbols, then coerces to a finite number.
pub fn clean_price(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number(value) if value.is_finite() => Some(*value),
        RawCell::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| !STRIPPED_PRICE_CHARS.contains(c))
                .collect();
            cleaned
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
        }
        _ => None,
    }
}

pub fn clean_date(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Date(date) => Some(*date),
        RawCell::Text(text) => parse_date(text),
        _ => None,
    }
}

fn find_column(headers: &[String], wanted: &str, path: &Path) -> Result<usize, LoaderError> {
    let key = wanted.trim().to_lowercase();
    headers
        .iter()
        .position(|h| h.trim().to_lowercase() == key)
        .ok_or_else(|| LoaderError::MissingColumn {
            path: path.to_path_buf(),
            column: wanted.to_string(),
        })
}

/// Turns a raw table into a date-sorted price series, dropping rows whose
/// price or date cannot be coerced.
pub fn normalize_table(
    table: RawTable,
    columns: &ColumnNames<'_>,
    path: &Path,
) -> Result<NormalizedTable, LoaderError> {
    let date_idx = find_column(&table.headers, columns.date, path)?;
    let price_idx = find_column(&table.headers, columns.price, path)?;
    let aux_indices: Vec<usize> = (0..table.headers.len())
        .filter(|&i| i != date_idx && i != price_idx)
        .collect();

    let mut stats = LoadStats {
        rows_read: table.rows.len(),
        ..LoadStats::default()
    };
    let mut kept: Vec<(PricePoint, Vec<String>)> = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let cell = |i: usize| row.get(i).unwrap_or(&EMPTY_CELL);
        let Some(price) = clean_price(cell(price_idx)) else {
            stats.dropped_price += 1;
            continue;
        };
        let Some(date) = clean_date(cell(date_idx)) else {
            stats.dropped_date += 1;
            continue;
        };
        let aux = aux_indices.iter().map(|&i| cell(i).to_string()).collect();
        kept.push((PricePoint { date, price }, aux));
    }

    // stable: rows sharing a date keep file order
    kept.sort_by_key(|(point, _)| point.date);

    let mut auxiliary: Vec<AuxiliaryColumn> = aux_indices
        .iter()
        .map(|&i| AuxiliaryColumn {
            name: table.headers[i].clone(),
            values: Vec::with_capacity(kept.len()),
        })
        .collect();
    let mut points = Vec::with_capacity(kept.len());
    for (point, aux) in kept {
        points.push(point);
        for (column, value) in auxiliary.iter_mut().zip(aux) {
            column.values.push(value);
        }
    }

    Ok(NormalizedTable {
        points,
        auxiliary,
        stats,
    })
}
