//! Prediction lookups.

use axum::extract::{Path, State};
use axum::Json;

use super::case_studies::parse_case_study_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::Prediction;

/// `GET /predictions/:case_study_id`
pub async fn for_case_study(
    State(ctx): State<ApiContext>,
    Path(case_study_id): Path<String>,
) -> Result<Json<Prediction>, ApiError> {
    let id = parse_case_study_id(&case_study_id)?;
    let conn = ctx.core.open_db()?;

    let prediction = ctx.core.store().get_prediction(&conn, &id)?.ok_or_else(|| {
        ApiError::NotFound(format!("No prediction found for case study ID: {id}"))
    })?;
    Ok(Json(prediction))
}

/// `GET /predictions`: 404 when nothing has been graded yet.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Prediction>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let predictions = ctx.core.store().list_predictions(&conn)?;
    if predictions.is_empty() {
        return Err(ApiError::NotFound("No predictions found".into()));
    }
    Ok(Json(predictions))
}
