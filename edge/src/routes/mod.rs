//! API route definitions.
//!
//! This module organizes all HTTP routes for the edge service.

mod forward;
mod health;

pub use forward::forward_routes;
pub use health::health_routes;
