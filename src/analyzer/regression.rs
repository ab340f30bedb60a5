use crate::model::{RegressionError, Series, TrendLine};

/// Fits `price = slope * days + intercept`, where `days` counts whole days
/// from the earliest date in the series.
pub fn fit_trend(series: &Series) -> Result<TrendLine, RegressionError> {
    let valid: Vec<_> = series
        .points
        .iter()
        .filter(|p| p.price.is_finite())
        .collect();
    if valid.len() < 2 {
        return Err(RegressionError::InsufficientPoints {
            name: series.name.clone(),
            found: valid.len(),
        });
    }

    let first = valid[0].date;
    let (origin, last_date) = valid
        .iter()
        .fold((first, first), |(lo, hi), p| (lo.min(p.date), hi.max(p.date)));

    let xs: Vec<f64> = valid
        .iter()
        .map(|p| (p.date - origin).num_days() as f64)
        .collect();
    let ys: Vec<f64> = valid.iter().map(|p| p.price).collect();

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return Err(RegressionError::ZeroTimeSpan {
            name: series.name.clone(),
        });
    }
    let sxy: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let span = (last_date - origin).num_days();

    Ok(TrendLine {
        slope_per_day: slope,
        intercept,
        points_used: valid.len(),
        start: (origin, intercept),
        end: (last_date, slope * span as f64 + intercept),
    })
}

impl TrendLine {
    pub fn value_at(&self, days: f64) -> f64 {
        self.slope_per_day * days + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricePoint;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
    }

    fn series_from(points: &[(i64, f64)]) -> Series {
        Series::new(
            "Stock A",
            points
                .iter()
                .map(|&(d, price)| PricePoint {
                    date: start() + Duration::days(d),
                    price,
                })
                .collect(),
        )
    }

    #[test]
    fn test_perfect_line() {
        let points: Vec<(i64, f64)> = (0..10).map(|d| (d, 2.0 * d as f64 + 5.0)).collect();
        let trend = fit_trend(&series_from(&points)).unwrap();

        assert_relative_eq!(trend.slope_per_day, 2.0, epsilon = 1e-6);
        assert_relative_eq!(trend.intercept, 5.0, epsilon = 1e-6);
        assert_eq!(trend.points_used, 10);
        assert_eq!(trend.start.0, start());
        assert_eq!(trend.end.0, start() + Duration::days(9));
        assert_relative_eq!(trend.end.1, 23.0, epsilon = 1e-6);
    }

    #[test]
    fn test_uneven_spacing_uses_calendar_days() {
        // weekend gap: days 0, 1, 4, 5 on the same line
        let points = [(0, 5.0), (1, 7.0), (4, 13.0), (5, 15.0)];
        let trend = fit_trend(&series_from(&points)).unwrap();
        assert_relative_eq!(trend.slope_per_day, 2.0, epsilon = 1e-9);
        assert_relative_eq!(trend.value_at(10.0), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_origin_is_min_date_even_if_unsorted() {
        let points = [(3, 11.0), (0, 5.0), (1, 7.0)];
        let trend = fit_trend(&series_from(&points)).unwrap();
        assert_relative_eq!(trend.intercept, 5.0, epsilon = 1e-9);
        assert_eq!(trend.start.0, start());
        assert_eq!(trend.end.0, start() + Duration::days(3));
        assert_relative_eq!(trend.end.1, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let err = fit_trend(&series_from(&[(0, 5.0)])).unwrap_err();
        assert_eq!(
            err,
            RegressionError::InsufficientPoints {
                name: "Stock A".into(),
                found: 1
            }
        );
        let err = fit_trend(&series_from(&[(0, 5.0), (1, f64::NAN)])).unwrap_err();
        assert!(matches!(err, RegressionError::InsufficientPoints { found: 1, .. }));
    }

    #[test]
    fn test_single_date_has_no_span() {
        let err = fit_trend(&series_from(&[(2, 5.0), (2, 6.0)])).unwrap_err();
        assert!(matches!(err, RegressionError::ZeroTimeSpan { .. }));
    }
}
