use crate::analyzer::market_indicators::MarketIndicators;
use crate::model::{AlignedPanel, AlignmentError, CorrelationMatrix, Series};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One value per date; a later row with the same date replaces an earlier one.
fn dedupe_by_date(series: &Series) -> BTreeMap<NaiveDate, f64> {
    let mut by_date = BTreeMap::new();
    for point in &series.points {
        by_date.insert(point.date, point.price);
    }
    by_date
}

/// Carries the last known value forward, then fills any leading gap with
/// the first known value.
fn fill_gaps(column: &mut [Option<f64>]) {
    let mut last = None;
    for cell in column.iter_mut() {
        if cell.is_some() {
            last = *cell;
        } else {
            *cell = last;
        }
    }
    if let Some(first) = column.iter().flatten().next().copied() {
        for cell in column.iter_mut().take_while(|c| c.is_none()) {
            *cell = Some(first);
        }
    }
}

/// Reindexes every series onto the union of their dates.
pub fn align(series: &[Series]) -> AlignedPanel {
    let deduped: Vec<BTreeMap<NaiveDate, f64>> = series.iter().map(dedupe_by_date).collect();
    let dates: Vec<NaiveDate> = deduped
        .iter()
        .flat_map(|m| m.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let columns = deduped
        .iter()
        .map(|by_date| {
            let mut column: Vec<Option<f64>> =
                dates.iter().map(|d| by_date.get(d).copied()).collect();
            fill_gaps(&mut column);
            column
        })
        .collect();

    AlignedPanel {
        dates,
        names: series.iter().map(|s| s.name.clone()).collect(),
        columns,
    }
}

impl AlignedPanel {
    pub fn period_returns(&self) -> Vec<Vec<Option<f64>>> {
        self.columns
            .iter()
            .map(|c| MarketIndicators::period_returns(c))
            .collect()
    }

    pub fn correlation_matrix(&self) -> CorrelationMatrix {
        let returns = self.period_returns();
        let n = returns.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            values[i][i] = Some(1.0);
            for j in (i + 1)..n {
                let r = MarketIndicators::pairwise_correlation(&returns[i], &returns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        CorrelationMatrix {
            labels: self.names.clone(),
            values,
        }
    }
}

/// Aligns the collection and correlates the period returns. At least two
/// instruments are required.
pub fn correlate(series: &[Series]) -> Result<(AlignedPanel, CorrelationMatrix), AlignmentError> {
    if series.len() < 2 {
        return Err(AlignmentError::InsufficientData {
            found: series.len(),
        });
    }
    let panel = align(series);
    let matrix = panel.correlation_matrix();
    Ok((panel, matrix))
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(7);
        write!(f, "{:width$}", "", width = width)?;
        for label in &self.labels {
            write!(f, "  {:>width$}", label, width = width)?;
        }
        for (label, row) in self.labels.iter().zip(&self.values) {
            writeln!(f)?;
            write!(f, "{:<width$}", label, width = width)?;
            for value in row {
                match value {
                    Some(v) => write!(f, "  {:>width$.4}", v, width = width)?,
                    None => write!(f, "  {:>width$}", "n/a", width = width)?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricePoint;
    use approx::assert_relative_eq;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
    }

    fn series(name: &str, points: &[(i64, f64)]) -> Series {
        Series::new(
            name,
            points
                .iter()
                .map(|&(d, price)| PricePoint { date: day(d), price })
                .collect(),
        )
    }

    fn random_walk(name: &str, rng: &mut StdRng, len: i64) -> Series {
        let mut price = 100.0;
        let mut points = Vec::new();
        for d in 0..len {
            // roughly one day in ten is missing
            if rng.random_bool(0.9) {
                price *= 1.0 + rng.random_range(-0.03..0.03);
                points.push((d, price));
            }
        }
        series(name, &points)
    }

    #[test]
    fn test_align_union_and_fill() {
        let a = series("A", &[(0, 1.0), (2, 3.0)]);
        let b = series("B", &[(1, 10.0), (3, 30.0)]);
        let panel = align(&[a, b]);

        assert_eq!(panel.dates, vec![day(0), day(1), day(2), day(3)]);
        assert_eq!(panel.columns[0], vec![Some(1.0), Some(1.0), Some(3.0), Some(3.0)]);
        // leading gap is back-filled from the first observation
        assert_eq!(panel.columns[1], vec![Some(10.0), Some(10.0), Some(10.0), Some(30.0)]);
    }

    #[test]
    fn test_duplicate_dates_keep_last() {
        let a = series("A", &[(0, 1.0), (1, 2.0), (1, 5.0)]);
        let b = series("B", &[(0, 1.0), (1, 1.0)]);
        let panel = align(&[a, b]);

        assert_eq!(panel.dates, vec![day(0), day(1)]);
        assert_eq!(panel.columns[0], vec![Some(1.0), Some(5.0)]);
        assert!(panel.dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_instrument_stays_null() {
        let a = series("A", &[(0, 1.0), (1, 2.0)]);
        let b = series("B", &[]);
        let panel = align(&[a, b]);
        assert!(panel.columns[1].iter().all(Option::is_none));
        let matrix = panel.correlation_matrix();
        assert_eq!(matrix.get(1, 1), Some(1.0));
        assert_eq!(matrix.get(0, 1), None);
    }

    #[test]
    fn test_single_instrument_is_insufficient() {
        let a = series("A", &[(0, 1.0), (1, 2.0)]);
        let err = correlate(&[a]).unwrap_err();
        assert_eq!(err, AlignmentError::InsufficientData { found: 1 });
        assert_eq!(correlate(&[]).unwrap_err(), AlignmentError::InsufficientData { found: 0 });
    }

    #[test]
    fn test_matrix_properties_on_random_walks() {
        let mut rng = StdRng::seed_from_u64(42);
        let collection: Vec<Series> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| random_walk(name, &mut rng, 300))
            .collect();
        let (_, matrix) = correlate(&collection).unwrap();

        assert_eq!(matrix.size(), 4);
        for i in 0..4 {
            assert_relative_eq!(matrix.get(i, i).unwrap(), 1.0, epsilon = 1e-9);
            for j in 0..4 {
                let v = matrix.get(i, j).unwrap();
                assert!((-1.0..=1.0).contains(&v));
                assert_relative_eq!(v, matrix.get(j, i).unwrap(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_identical_moves_correlate_fully() {
        let a = series("A", &[(0, 10.0), (1, 11.0), (2, 10.5), (3, 12.0)]);
        let b = series("B", &[(0, 20.0), (1, 22.0), (2, 21.0), (3, 24.0)]);
        let (_, matrix) = correlate(&[a, b]).unwrap();
        assert_relative_eq!(matrix.get(0, 1).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_matrix_rendering() {
        let matrix = CorrelationMatrix {
            labels: vec!["A".into(), "B".into()],
            values: vec![vec![Some(1.0), Some(0.5)], vec![Some(0.5), Some(1.0)]],
        };
        let text = matrix.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("0.5000"));
        assert!(text.contains("1.0000"));
    }
}
