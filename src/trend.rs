//! Projects a per-year series onto a target year.

use crate::types::year_series::YearSeries;

/// Minimum number of years before a linear trend is fitted instead of taking the mean.
pub const TREND_MIN_POINTS: usize = 4;

/// Estimates the value of `series` in `target_year`.
///
/// * empty series: `None`
/// * fewer than [`TREND_MIN_POINTS`] values: their arithmetic mean
/// * otherwise: the ordinary least squares line through `(year, value)`, evaluated at
///   `target_year`
///
/// The fit is done on years centred at their mean, which keeps the sums small for
/// four-digit years.
///
/// ```
/// use climatrend::{trend, YearSeries};
///
/// let series: YearSeries = (2015..=2019).map(|y| (y, 10.0 + 2.0 * (y - 2015) as f64)).collect();
/// let projected = trend::estimate(&series, 2020).unwrap();
/// assert!((projected - 20.0).abs() < 1e-9);
/// ```
pub fn estimate(series: &YearSeries, target_year: i32) -> Option<f64> {
    let mean_value = series.mean()?;
    if series.len() < TREND_MIN_POINTS {
        return Some(mean_value);
    }

    let n = series.len() as f64;
    let mean_year = series.iter().map(|(year, _)| f64::from(year)).sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (year, value) in series.iter() {
        let dx = f64::from(year) - mean_year;
        sxy += dx * (value - mean_value);
        sxx += dx * dx;
    }
    if sxx == 0.0 {
        return Some(mean_value);
    }

    let slope = sxy / sxx;
    Some(mean_value + slope * (f64::from(target_year) - mean_year))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_has_no_estimate() {
        assert_eq!(estimate(&YearSeries::new(), 2020), None);
    }

    #[test]
    fn test_short_series_uses_mean() {
        let series: YearSeries = [(2015, 10.0), (2016, 20.0), (2017, 30.0)].into_iter().collect();
        assert_eq!(estimate(&series, 2030), Some(20.0));

        let single: YearSeries = [(2018, 7.5)].into_iter().collect();
        assert_eq!(estimate(&single, 2020), Some(7.5));
    }

    #[test]
    fn test_linear_series_is_projected_exactly() {
        let series: YearSeries = [(2015, 10.0), (2016, 12.0), (2017, 14.0), (2018, 16.0), (2019, 18.0)]
            .into_iter()
            .collect();
        let v = estimate(&series, 2020).unwrap();
        assert!((v - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_switches_to_regression() {
        // Three points average to 2; the fourth turns on the fit.
        let mut series: YearSeries = [(2015, 1.0), (2016, 2.0), (2017, 3.0)].into_iter().collect();
        assert_eq!(estimate(&series, 2024), Some(2.0));
        series.push(2018, 4.0);
        let v = estimate(&series, 2024).unwrap();
        assert!((v - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_gaps_in_years_are_respected() {
        let series: YearSeries = [(2015, 0.0), (2017, 2.0), (2020, 5.0), (2024, 9.0)]
            .into_iter()
            .collect();
        let v = estimate(&series, 2025).unwrap();
        assert!((v - 10.0).abs() < 1e-9);
    }
}
