//! Pipeline triggers. Both return as soon as the work is queued.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, MessageResponse};

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub message: String,
    /// Case studies eligible when the request arrived, not a completion count.
    pub processed_count: u32,
}

/// `POST /process_case_studies/`: queue the extraction phase.
pub async fn process_case_studies(
    State(ctx): State<ApiContext>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let pending = ctx.core.store().count_unprocessed(&conn)?;

    if pending == 0 {
        return Ok(Json(ProcessResponse {
            message: "No unprocessed case studies found".into(),
            processed_count: 0,
        }));
    }

    drop(ctx.background.spawn_extraction());
    tracing::info!(pending, "Extraction queued");

    Ok(Json(ProcessResponse {
        message: format!("Processing {pending} case studies in the background"),
        processed_count: pending,
    }))
}

/// `POST /train_model/`: queue the prediction phase.
pub async fn train_model(State(ctx): State<ApiContext>) -> Json<MessageResponse> {
    drop(ctx.background.spawn_predictions());
    tracing::info!("Prediction phase queued");
    Json(MessageResponse::new("Model training started in the background"))
}
