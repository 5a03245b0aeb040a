//! Temperature report model and scale conversion.

use serde::{Deserialize, Serialize};

/// Decimal places kept in every reported temperature.
const REPORT_PRECISION: i32 = 2;

/// Rounds `value` to `places` decimal places, halves away from zero.
///
/// Values too large to scale without overflowing are returned unchanged; they
/// carry no fractional digits to round anyway.
///
/// # Example
///
/// ```
/// use shared::models::round_to;
///
/// assert!((round_to(0.125, 2) - 0.13).abs() < f64::EPSILON);
/// assert!((round_to(-0.125, 2) + 0.13).abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// One temperature expressed in the three reported scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperatures {
    /// Degrees Celsius.
    pub celsius: f64,
    /// Degrees Fahrenheit.
    pub fahrenheit: f64,
    /// Kelvin.
    pub kelvin: f64,
}

impl Temperatures {
    /// Converts a Celsius reading into all three scales, each rounded to two
    /// decimal places.
    ///
    /// Fahrenheit is `c * 1.8 + 32` and Kelvin is `c + 273.15`, both computed
    /// from the unrounded input.
    #[must_use]
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            celsius: round_to(celsius, REPORT_PRECISION),
            fahrenheit: round_to(celsius * 1.8 + 32.0, REPORT_PRECISION),
            kelvin: round_to(celsius + 273.15, REPORT_PRECISION),
        }
    }
}

/// The backend's response body for a resolved postal code.
///
/// Serialized as `{"city": ..., "temp_C": ..., "temp_F": ..., "temp_K": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReport {
    /// Locality name resolved from the postal code.
    pub city: String,
    /// Temperature in degrees Celsius.
    #[serde(rename = "temp_C")]
    pub temp_c: f64,
    /// Temperature in degrees Fahrenheit.
    #[serde(rename = "temp_F")]
    pub temp_f: f64,
    /// Temperature in Kelvin.
    #[serde(rename = "temp_K")]
    pub temp_k: f64,
}

impl TemperatureReport {
    /// Builds a report for `city` from a Celsius reading.
    #[must_use]
    pub fn from_celsius(city: impl Into<String>, celsius: f64) -> Self {
        let temperatures = Temperatures::from_celsius(celsius);
        Self {
            city: city.into(),
            temp_c: temperatures.celsius,
            temp_f: temperatures.fahrenheit,
            temp_k: temperatures.kelvin,
        }
    }
}
