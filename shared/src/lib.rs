//! Cep Weather Shared Library
//!
//! This crate contains the types and plumbing shared by the edge and backend
//! services of the Cep Weather pipeline.
//!
//! # Modules
//!
//! - [`models`] - Postal code input and temperature report models
//! - [`telemetry`] - Trace context propagation and OTLP exporter bootstrap
//! - [`server`] - HTTP server bootstrap with bounded graceful shutdown
//! - [`config`] - Environment variable helpers
//!
//! # Example
//!
//! ```
//! use shared::models::{CepInput, TemperatureReport};
//!
//! let cep = CepInput::new("01001000").into_postal_code().unwrap();
//! assert_eq!(cep.as_str(), "01001000");
//!
//! let report = TemperatureReport::from_celsius("São Paulo", 28.5);
//! assert!((report.temp_f - 83.3).abs() < f64::EPSILON);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod models;
pub mod server;
pub mod telemetry;

/// Re-export common dependencies for convenience.
pub use serde;
pub use serde_json;
pub use validator;
