//! Welcome and status endpoints.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::types::{ApiContext, MessageResponse};

/// `GET /`
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new(format!(
        "Welcome to the {} Medical Case Studies API",
        crate::config::APP_NAME
    )))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub database_connection: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// `GET /status`: always 200; an unreachable or unmigrated store reports
/// `degraded`. Read-only, never provisions the database.
pub async fn status(State(ctx): State<ApiContext>) -> Json<StatusResponse> {
    let (status, database_connection, error) = match ctx.core.check_store() {
        Ok(_) => ("operational", "successful", None),
        Err(e) => {
            tracing::error!(error = %e, "Store check failed");
            ("degraded", "failed", Some(e.to_string()))
        }
    };

    Json(StatusResponse {
        status,
        database_connection,
        error,
        version: crate::config::APP_VERSION,
        timestamp: Utc::now(),
    })
}
