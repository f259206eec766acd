//! Case-study endpoints.
//!
//! - `POST /case_studies/`: ingest a narrative
//! - `GET /case_studies/unprocessed`: awaiting extraction
//! - `GET /case_studies/:id/with_prediction`: record plus its grade, if any

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{CaseStudy, CaseStudyWithPrediction, NewCaseStudy};

/// `POST /case_studies/`: store a new unprocessed case study.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<NewCaseStudy>, JsonRejection>,
) -> Result<Json<CaseStudy>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Case study text must not be empty".into()));
    }

    let conn = ctx.core.open_db()?;
    let case = CaseStudy::new(body.text);
    ctx.core.store().insert_case_study(&conn, &case)?;

    tracing::info!(case_study_id = %case.id, "Case study created");
    Ok(Json(case))
}

/// `GET /case_studies/unprocessed`
pub async fn unprocessed(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<CaseStudy>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let cases = ctx.core.store().unprocessed_case_studies(&conn)?;
    Ok(Json(cases))
}

/// `GET /case_studies/:id/with_prediction`
pub async fn with_prediction(
    State(ctx): State<ApiContext>,
    Path(case_study_id): Path<String>,
) -> Result<Json<CaseStudyWithPrediction>, ApiError> {
    let id = parse_case_study_id(&case_study_id)?;
    let conn = ctx.core.open_db()?;
    let store = ctx.core.store();

    let case_study = store.get_case_study(&conn, &id)?.ok_or_else(|| {
        ApiError::NotFound(format!("Case study with ID {id} not found"))
    })?;
    let prediction = store.get_prediction(&conn, &id)?;

    Ok(Json(CaseStudyWithPrediction {
        case_study,
        prediction,
    }))
}

pub(crate) fn parse_case_study_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid case study ID: {e}")))
}
