//! Data models for the Cep Weather pipeline.
//!
//! All models are transient, per-request values: the postal code input accepted
//! by both services and the temperature report produced by the backend.

pub mod postal_code;
pub mod temperature;

pub use postal_code::{CepInput, InvalidPostalCode, PostalCode, POSTAL_CODE_LENGTH};
pub use temperature::{round_to, Temperatures, TemperatureReport};
