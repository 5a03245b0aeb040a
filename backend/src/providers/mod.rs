//! Outbound provider clients.
//!
//! Each resolver performs exactly one HTTP call per invocation, inside its own
//! child span, with the trace context injected into the request headers.
//!
//! - [`GeocodeResolver`] - postal code to locality name (`ViaCEP`)
//! - [`TemperatureResolver`] - locality name to Celsius reading (`WeatherAPI`)

mod geocode;
mod weather;

pub use geocode::{GeocodeError, GeocodeResolver};
pub use weather::{ProviderNumber, TemperatureResolver, WeatherError};
