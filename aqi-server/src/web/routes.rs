//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::Coordinate;
use crate::lookup::{AqiReport, LookupError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/aqi", get(get_aqi))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Air quality at the CPCB station nearest to a coordinate.
async fn get_aqi(
    State(state): State<AppState>,
    Query(req): Query<AqiQuery>,
) -> Result<Json<AqiReport>, AppError> {
    let user = Coordinate::new(req.lat, req.lon);
    if !user.is_finite() {
        return Err(AppError::BadRequest {
            message: format!("coordinates must be finite, got ({}, {})", req.lat, req.lon),
        });
    }

    // The pipeline runs in its own task so it still completes, and closes its
    // browser session, if the client disconnects.
    let lookup = Arc::clone(&state.lookup);
    let report = tokio::spawn(async move { lookup.lookup(user).await })
        .await
        .map_err(|e| AppError::Internal {
            message: format!("lookup task failed: {e}"),
        })??;

    Ok(Json(report))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NoStation => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { detail: message })).into_response()
    }
}
