//! Pipeline error kinds.
//!
//! A small closed set so callers can tell retryable conditions (store outage,
//! extractor hiccup) from terminal ones (missing record, inconsistent state).

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Feature extraction failed for case study {case_study_id}: {reason}")]
    ExtractionFailed { case_study_id: Uuid, reason: String },

    #[error("Inconsistent state: {0}")]
    Inconsistent(String),

    /// A concurrent run already wrote the record this run tried to insert.
    #[error("Duplicate write rejected: {0}")]
    Conflict(String),
}

impl PipelineError {
    /// Retryable kinds clear up on a later run without intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::StoreUnavailable(_) | PipelineError::ExtractionFailed { .. }
        )
    }
}

impl From<DatabaseError> for PipelineError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return PipelineError::Conflict(err.to_string());
        }
        match err {
            DatabaseError::InvalidEnum { .. } | DatabaseError::Serialization(_) => {
                PipelineError::Inconsistent(err.to_string())
            }
            other => PipelineError::StoreUnavailable(other.to_string()),
        }
    }
}
