//! Quantities and text derived from a [`ForecastResult`].

use crate::types::forecast_result::ForecastResult;

const MAGNUS_B: f64 = 17.625;
const MAGNUS_C: f64 = 243.04;

fn defined(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Relative humidity in percent from an air temperature and a dew point (both in °C),
/// using the Magnus approximation. The result is clamped to `[0, 100]`.
///
/// Returns `None` when either input is missing or the result is undefined.
///
/// ```
/// use climatrend::relative_humidity;
///
/// assert_eq!(relative_humidity(Some(20.0), Some(20.0)), Some(100.0));
/// let rh = relative_humidity(Some(25.0), Some(15.0)).unwrap();
/// assert!((rh - 53.8).abs() < 0.5);
/// assert_eq!(relative_humidity(None, Some(10.0)), None);
/// ```
pub fn relative_humidity(temperature: Option<f64>, dew_point: Option<f64>) -> Option<f64> {
    let t = defined(temperature)?;
    let td = defined(dew_point)?;
    let gamma = MAGNUS_B * td / (MAGNUS_C + td) - MAGNUS_B * t / (MAGNUS_C + t);
    let rh = 100.0 * gamma.exp();
    if rh.is_nan() {
        return None;
    }
    Some(rh.clamp(0.0, 100.0))
}

fn temperature_band(temperature: Option<f64>) -> &'static str {
    match temperature {
        None => "temperature unavailable",
        Some(t) if t < 5.0 => "Very Cold",
        Some(t) if t < 12.0 => "Cold",
        Some(t) if t < 18.0 => "Cool/Mild",
        Some(t) if t < 24.0 => "Warm/Pleasant",
        Some(_) => "Hot",
    }
}

fn precipitation_clause(precipitation: Option<f64>) -> Option<&'static str> {
    match precipitation {
        None => None,
        Some(p) if p < 0.0 => None,
        Some(p) if p <= 0.1 => Some("mostly clear skies"),
        Some(p) if p <= 1.0 => Some("possible drizzle"),
        Some(p) if p <= 5.0 => Some("chance of rain"),
        Some(_) => Some("heavy rain expected"),
    }
}

/// One-sentence summary of a forecast, e.g.
/// `"The forecast is Cool/Mild (approx. 15.0°C) with mostly clear skies."`.
pub fn long_description(result: &ForecastResult) -> String {
    let temperature = defined(result.temperature);
    let band = temperature_band(temperature);
    let approx = match temperature {
        Some(t) => format!("{:.1}°C", t),
        None => "N/A".to_string(),
    };
    match precipitation_clause(defined(result.precipitation)) {
        Some(clause) => format!("The forecast is {} (approx. {}) with {}.", band, approx, clause),
        None => format!("The forecast is {} (approx. {}).", band, approx),
    }
}

/// Single-word summary: `Rainy`, `Unknown`, `Hot`, `Warm`, `Mild` or `Cold`.
///
/// Heavy precipitation wins over any temperature.
pub fn short_description(result: &ForecastResult) -> &'static str {
    if defined(result.precipitation).is_some_and(|p| p > 1.0) {
        return "Rainy";
    }
    match defined(result.temperature) {
        None => "Unknown",
        Some(t) if t > 24.0 => "Hot",
        Some(t) if t > 18.0 => "Warm",
        Some(t) if t > 12.0 => "Mild",
        Some(_) => "Cold",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(temperature: Option<f64>, precipitation: Option<f64>) -> ForecastResult {
        ForecastResult {
            temperature,
            humidity: None,
            precipitation,
        }
    }

    #[test]
    fn test_relative_humidity_stays_in_range() {
        let samples = [-60.0, -40.0, -10.0, 0.0, 12.5, 30.0, 45.0, 60.0];
        for t in samples {
            for td in samples {
                let rh = relative_humidity(Some(t), Some(td)).unwrap();
                assert!((0.0..=100.0).contains(&rh), "rh({}, {}) = {}", t, td, rh);
            }
            assert_eq!(relative_humidity(Some(t), Some(t)), Some(100.0));
        }
        // Dew point above air temperature is clamped.
        assert_eq!(relative_humidity(Some(10.0), Some(20.0)), Some(100.0));
    }

    #[test]
    fn test_relative_humidity_undefined_inputs() {
        assert_eq!(relative_humidity(Some(10.0), None), None);
        assert_eq!(relative_humidity(Some(f64::NAN), Some(3.0)), None);
        // Singular denominator.
        assert_eq!(relative_humidity(Some(-243.04), Some(-243.04)), None);
    }

    #[test]
    fn test_long_description_bands() {
        assert_eq!(
            long_description(&result(Some(15.0), Some(0.0))),
            "The forecast is Cool/Mild (approx. 15.0°C) with mostly clear skies."
        );
        assert_eq!(
            long_description(&result(Some(4.99), Some(0.5))),
            "The forecast is Very Cold (approx. 5.0°C) with possible drizzle."
        );
        assert_eq!(
            long_description(&result(Some(24.0), Some(5.0))),
            "The forecast is Hot (approx. 24.0°C) with chance of rain."
        );
        assert_eq!(
            long_description(&result(Some(18.0), Some(12.0))),
            "The forecast is Warm/Pleasant (approx. 18.0°C) with heavy rain expected."
        );
        assert_eq!(
            long_description(&result(Some(5.0), Some(-1.0))),
            "The forecast is Cold (approx. 5.0°C)."
        );
        assert_eq!(
            long_description(&result(None, None)),
            "The forecast is temperature unavailable (approx. N/A)."
        );
    }

    #[test]
    fn test_short_description_bands() {
        assert_eq!(short_description(&result(Some(30.0), Some(1.5))), "Rainy");
        assert_eq!(short_description(&result(None, Some(2.0))), "Rainy");
        assert_eq!(short_description(&result(None, Some(1.0))), "Unknown");
        assert_eq!(short_description(&result(Some(24.5), None)), "Hot");
        assert_eq!(short_description(&result(Some(24.0), None)), "Warm");
        assert_eq!(short_description(&result(Some(15.0), None)), "Mild");
        assert_eq!(short_description(&result(Some(12.0), Some(0.3))), "Cold");
    }
}
