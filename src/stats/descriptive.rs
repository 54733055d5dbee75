//! Small descriptive statistics over daily samples.

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// `(current - mean) / std`, or 0 when the sample has no spread.
pub fn z_score(current: f64, mean: f64, std: f64) -> f64 {
    if std > 0.0 { (current - mean) / std } else { 0.0 }
}

/// Percentile rank of `score` within `values`, 0..=100.
///
/// Ties are averaged: the result is the mean of the share strictly below
/// `score` and the share at or below it.
pub fn percentile_of_score(values: &[f64], score: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let below = values.iter().filter(|v| **v < score).count();
    let at_or_below = values.iter().filter(|v| **v <= score).count();
    (below + at_or_below) as f64 * 50.0 / values.len() as f64
}

/// Mean of the last `window` values, or of all values when fewer exist.
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    if window == 0 || values.len() < window {
        return mean(values);
    }
    mean(&values[values.len() - window..])
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_averages_ties() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_of_score(&values, 3.0), 62.5);
        assert_eq!(percentile_of_score(&values, 0.5), 0.0);
        assert_eq!(percentile_of_score(&values, 9.0), 100.0);
        assert_eq!(percentile_of_score(&[5.0, 5.0, 5.0], 5.0), 50.0);
    }

    #[test]
    fn test_percentile_of_mean_in_symmetric_sample() {
        let values: Vec<f64> = (0..=40).map(|i| 10.0 + i as f64 * 0.5).collect();
        let m = mean(&values);
        assert!((percentile_of_score(&values, m) - 50.0).abs() <= 5.0);
    }

    #[test]
    fn test_population_std_and_z() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(std_dev(&values), 2.0);
        assert_eq!(z_score(9.0, 5.0, 2.0), 2.0);
        assert_eq!(z_score(9.0, 5.0, 0.0), 0.0);
    }

    #[test]
    fn test_trailing_mean_falls_back_to_full_mean() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(trailing_mean(&values, 2), 3.5);
        assert_eq!(trailing_mean(&values, 10), 2.5);
        assert_eq!(trailing_mean(&[], 3), 0.0);
    }

    #[test]
    fn test_min_max() {
        let values = [3.0, -1.0, 7.5];
        assert_eq!(min(&values), -1.0);
        assert_eq!(max(&values), 7.5);
    }
}
