//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query for `GET /aqi`.
#[derive(Debug, Deserialize)]
pub struct AqiQuery {
    /// Latitude in decimal degrees
    #[serde(alias = "latitude")]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[serde(alias = "longitude")]
    pub lon: f64,
}

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
