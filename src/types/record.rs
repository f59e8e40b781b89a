//! Defines the `Record` structure: one historical snapshot of scattered sample points
//! together with the per-variable values measured at those points.

use crate::types::timestamp_key::TimestampKey;
use crate::types::variable::Variable;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single historical snapshot stored in a climate dataset.
///
/// `points` holds `(longitude, latitude)` pairs. Each entry of `variables` is index-aligned
/// with `points`. A record may omit any variable; that only means the snapshot has no data
/// for it.
///
/// # Examples
///
/// ```
/// use climatrend::{Record, Variable};
///
/// let record = Record::new("2019-06-01 12:00:00", vec![(-77.0, -12.0), (-76.0, -12.0), (-76.5, -11.0)])
///     .with_variable(Variable::Temperature, vec![18.5, 19.0, 17.2]);
///
/// assert_eq!(record.values(Variable::Temperature), Some(&[18.5, 19.0, 17.2][..]));
/// assert_eq!(record.values(Variable::Precipitation), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The hour this snapshot describes.
    pub key: TimestampKey,
    /// Sample locations as `(longitude, latitude)`.
    pub points: Vec<(f64, f64)>,
    /// Values per variable, each index-aligned with `points`.
    pub variables: BTreeMap<Variable, Vec<f64>>,
}

impl Record {
    pub fn new(key: impl Into<TimestampKey>, points: Vec<(f64, f64)>) -> Self {
        Self {
            key: key.into(),
            points,
            variables: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) the values of `variable`.
    pub fn with_variable(mut self, variable: Variable, values: Vec<f64>) -> Self {
        self.variables.insert(variable, values);
        self
    }

    /// The values of `variable`, or `None` when the record does not carry it or when
    /// its array is not aligned with `points`.
    pub fn values(&self, variable: Variable) -> Option<&[f64]> {
        self.variables
            .get(&variable)
            .filter(|values| values.len() == self.points.len())
            .map(Vec::as_slice)
    }

    /// Drops every variable whose array length differs from the number of points.
    ///
    /// Applied to every record read from a store, so both lookup modes observe
    /// exactly the same records.
    pub(crate) fn sanitized(mut self) -> Self {
        let expected = self.points.len();
        let key = &self.key;
        self.variables.retain(|variable, values| {
            let aligned = values.len() == expected;
            if !aligned {
                warn!(
                    "Record {} has {} values for {} but {} points; treating {} as absent",
                    key,
                    values.len(),
                    variable,
                    expected,
                    variable
                );
            }
            aligned
        });
        self
    }
}
