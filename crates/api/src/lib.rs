//! # Harvester API
//!
//! HTTP surface of the automation service: login flow, notification channel
//! management, manual job triggering and health.
//!
//! The router is a thin layer over the core services; every handler maps a
//! request onto one service call and translates the domain error into a
//! status code. No business rules live here.

pub mod error;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
