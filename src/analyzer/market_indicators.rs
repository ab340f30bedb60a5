/// Stateless numeric helpers shared by the analyzer and the correlator.
pub struct MarketIndicators;

impl MarketIndicators {
    /// Fractional change from the previous value. The first entry, and any
    /// entry whose predecessor is missing or zero, is `None`.
    pub fn period_returns(values: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut out = Vec::with_capacity(values.len());
        for i in 0..values.len() {
            let change = match (i.checked_sub(1).and_then(|p| values[p]), values[i]) {
                (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
                _ => None,
            };
            out.push(change);
        }
        out
    }

    /// Trailing moving average, `None` until `window` observations exist.
    pub fn rolling_mean(data: &[f64], window: usize) -> Vec<Option<f64>> {
        if window == 0 {
            return vec![None; data.len()];
        }
        (0..data.len())
            .map(|i| {
                if i + 1 < window {
                    None
                } else {
                    let sum: f64 = data[i + 1 - window..=i].iter().sum();
                    Some(sum / window as f64)
                }
            })
            .collect()
    }

    /// Sample standard deviation (n - 1). Needs at least two values.
    pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(variance.sqrt())
    }

    /// Calculates the Pearson correlation coefficient between two slices.
    /// Returns None if slices have different lengths, fewer than two
    /// points, or either side has zero variance.
    pub fn compute_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
        if x.len() != y.len() || x.len() < 2 {
            return None;
        }
        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;
        let numerator: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
            .sum();
        let denominator_x: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
        let denominator_y: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
        let denominator = (denominator_x * denominator_y).sqrt();
        if denominator == 0.0 {
            None
        } else {
            Some((numerator / denominator).clamp(-1.0, 1.0))
        }
    }

    /// Pearson correlation over the positions where both sides are defined.
    pub fn pairwise_correlation(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(y.iter())
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .unzip();
        Self::compute_correlation(&xs, &ys)
    }
}
