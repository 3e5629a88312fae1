//! # Portico Server
//!
//! Read-only HTTP surface of the Portico content backend: one route per
//! collection shaped by `?mode=`, the statistics reader, and a health probe.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
