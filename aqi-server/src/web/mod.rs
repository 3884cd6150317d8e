//! Web layer for the AQI service.
//!
//! Provides the `/aqi` lookup endpoint and a health check.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
