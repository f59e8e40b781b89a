//! Defines the `Variable` enum, the closed set of quantities a climate record may carry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A climate quantity stored per sample point in a [`crate::Record`].
///
/// On the wire and on disk each variant is addressed by its lowercase name
/// (`"temperature"`, `"humidity"`, `"precipitation"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    /// Air temperature in degrees Celsius.
    Temperature,
    /// Dew-point temperature in degrees Celsius. Relative humidity is derived from
    /// this and [`Variable::Temperature`], see [`crate::relative_humidity`].
    Humidity,
    /// Precipitation amount in millimetres.
    Precipitation,
}

impl Variable {
    /// Every variable, in the order forecasts are computed and reported.
    pub const ALL: [Variable; 3] = [
        Variable::Temperature,
        Variable::Humidity,
        Variable::Precipitation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variable::Temperature => "temperature",
            Variable::Humidity => "humidity",
            Variable::Precipitation => "precipitation",
        }
    }

    /// Parses a wire name back into a variable.
    ///
    /// ```
    /// use climatrend::Variable;
    ///
    /// assert_eq!(Variable::from_name("humidity"), Some(Variable::Humidity));
    /// assert_eq!(Variable::from_name("wind"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
