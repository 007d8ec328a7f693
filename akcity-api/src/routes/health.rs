/// Health check endpoint
///
/// Provides a simple health check endpoint that verifies:
/// - The server is running
/// - Database connectivity
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Server is running",
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "database": "connected",
///     "uptime": 42,
///     "timestamp": "2026-01-01T00:00:00Z"
///   }
/// }
/// ```

use crate::{app::AppState, error::ApiResult, response::Envelope};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Seconds since the server started
    pub uptime: u64,

    /// Server time when the check ran
    pub timestamp: DateTime<Utc>,
}

/// Health check handler
///
/// Returns service health status including database connectivity and
/// process uptime. Stays at 200 even when the database is unreachable;
/// the body carries the degradation.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Envelope<HealthResponse>>> {
    // Check database connectivity
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let health = HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    };

    Ok(Envelope::data("Server is running", health))
}
