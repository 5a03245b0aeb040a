//! API route definitions.
//!
//! This module organizes all HTTP routes for the backend service.

mod health;
mod weather;

pub use health::health_routes;
pub use weather::weather_routes;
