//! Defines `YearSeries`, the ordered `(year, value)` pairs fed to the trend estimator.

/// Per-query, per-variable series of interpolated values, one per historical year.
///
/// Years are strictly increasing and every value is finite: [`YearSeries::push`]
/// refuses anything else, so no not-a-number sentinel can reach the trend fit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearSeries {
    points: Vec<(i32, f64)>,
}

impl YearSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `(year, value)`. Returns `false` (and leaves the series unchanged) when
    /// `value` is not finite or `year` does not come after the last year.
    pub fn push(&mut self, year: i32, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if let Some(&(last_year, _)) = self.points.last() {
            if year <= last_year {
                return false;
            }
        }
        self.points.push((year, value));
        true
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.points.iter().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, v)| v)
    }

    /// Arithmetic mean of the values, `None` for an empty series.
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.values().sum::<f64>() / self.points.len() as f64)
    }
}

impl FromIterator<(i32, f64)> for YearSeries {
    /// Collects pairs through [`YearSeries::push`], dropping out-of-order or non-finite entries.
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        let mut series = YearSeries::new();
        for (year, value) in iter {
            series.push(year, value);
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rejects_nan_and_repeated_years() {
        let mut series = YearSeries::new();
        assert!(series.push(2015, 1.0));
        assert!(!series.push(2016, f64::NAN));
        assert!(!series.push(2015, 2.0));
        assert!(!series.push(2014, 2.0));
        assert!(series.push(2018, 3.0));
        assert_eq!(series.iter().collect::<Vec<_>>(), vec![(2015, 1.0), (2018, 3.0)]);
    }

    #[test]
    fn test_mean() {
        let series: YearSeries = [(2015, 10.0), (2016, 20.0), (2017, 30.0)].into_iter().collect();
        assert_eq!(series.mean(), Some(20.0));
        assert_eq!(YearSeries::new().mean(), None);
    }
}
