//! Trait definitions for the grading pipeline.
//!
//! Two seams keep the orchestrator independent of its collaborators:
//! - FeatureStore: reads/writes case studies, features and predictions
//! - FeatureExtractor: opaque text → feature map transform

use rusqlite::Connection;
use uuid::Uuid;

use super::error::PipelineError;
use crate::models::*;

/// Feature Store Accessor. Every write that could race with another run is
/// either idempotent or rejected by a UNIQUE constraint.
pub trait FeatureStore: Send + Sync {
    /// Insert a freshly ingested case study.
    fn insert_case_study(&self, conn: &Connection, case: &CaseStudy) -> Result<(), PipelineError>;

    /// Fetch one case study by id.
    fn get_case_study(&self, conn: &Connection, id: &Uuid) -> Result<Option<CaseStudy>, PipelineError>;

    /// All case studies with `processed = false`, oldest first.
    fn unprocessed_case_studies(&self, conn: &Connection) -> Result<Vec<CaseStudy>, PipelineError>;

    /// Count of case studies with `processed = false`.
    fn count_unprocessed(&self, conn: &Connection) -> Result<u32, PipelineError>;

    /// All case studies with `processed = true`, oldest first.
    fn processed_case_studies(&self, conn: &Connection) -> Result<Vec<CaseStudy>, PipelineError>;

    /// Write the features record. Returns `false` when one already existed
    /// for the case study (the existing record is left untouched).
    fn insert_features(
        &self,
        conn: &Connection,
        features: &ExtractedFeatures,
    ) -> Result<bool, PipelineError>;

    /// Features for one case study, if extraction completed.
    fn get_features(
        &self,
        conn: &Connection,
        case_study_id: &Uuid,
    ) -> Result<Option<ExtractedFeatures>, PipelineError>;

    /// Flip `processed` to true. Returns `false` if it was already set.
    fn mark_processed(&self, conn: &Connection, case_study_id: &Uuid) -> Result<bool, PipelineError>;

    /// Whether a prediction exists for the case study.
    fn prediction_exists(&self, conn: &Connection, case_study_id: &Uuid) -> Result<bool, PipelineError>;

    /// Insert a prediction. A second insert for the same case study fails
    /// with `PipelineError::Conflict`.
    fn insert_prediction(&self, conn: &Connection, prediction: &Prediction) -> Result<(), PipelineError>;

    /// Prediction for one case study.
    fn get_prediction(
        &self,
        conn: &Connection,
        case_study_id: &Uuid,
    ) -> Result<Option<Prediction>, PipelineError>;

    /// Every stored prediction, oldest first.
    fn list_predictions(&self, conn: &Connection) -> Result<Vec<Prediction>, PipelineError>;
}

/// Feature Extractor: case-study text → feature map.
pub trait FeatureExtractor: Send + Sync {
    /// Extract features from one case study's text.
    fn extract(&self, case_study: &CaseStudy) -> Result<FeatureMap, PipelineError>;
}
