//! Pipeline orchestrator: the two pipeline phases.
//!
//! Extraction: unprocessed case studies → features record → processed flag.
//! Prediction: processed case studies without a prediction → grade → insert.
//!
//! Both phases run sequentially over their eligible set and tolerate
//! per-record failure: a failed record is logged, counted and left for the
//! next run. Overlapping runs are safe because every write is gated twice,
//! once by a check in this module and once by the store's UNIQUE constraints.

use std::time::Instant;

use rusqlite::Connection;

use super::error::PipelineError;
use super::extractor::KeywordFeatureExtractor;
use super::grading;
use super::store::SqliteFeatureStore;
use super::traits::*;
use super::types::*;
use crate::models::*;

/// Orchestrates extraction and grading over a feature store.
pub struct PipelineRunner {
    store: Box<dyn FeatureStore>,
    extractor: Box<dyn FeatureExtractor>,
}

impl PipelineRunner {
    pub fn new(store: Box<dyn FeatureStore>, extractor: Box<dyn FeatureExtractor>) -> Self {
        Self { store, extractor }
    }

    /// SQLite store with the keyword extractor.
    pub fn with_defaults() -> Self {
        Self::new(
            Box::new(SqliteFeatureStore::new()),
            Box::new(KeywordFeatureExtractor::new()),
        )
    }

    pub fn store(&self) -> &dyn FeatureStore {
        self.store.as_ref()
    }

    /// Extraction phase.
    ///
    /// Features are written before the processed flag, so an interrupted run
    /// leaves the case study eligible; the repeat write is a no-op.
    pub fn process_pending_case_studies(
        &self,
        conn: &Connection,
    ) -> Result<ExtractionReport, PipelineError> {
        let start = Instant::now();

        let pending = self.store.unprocessed_case_studies(conn)?;
        if pending.is_empty() {
            tracing::debug!("No unprocessed case studies");
            return Ok(ExtractionReport::empty());
        }

        let mut report = ExtractionReport {
            eligible: pending.len() as u32,
            ..ExtractionReport::empty()
        };
        tracing::info!(eligible = report.eligible, "Extraction phase starting");

        for case in &pending {
            match self.extract_one(conn, case) {
                Ok(true) => report.processed += 1,
                Ok(false) => {
                    tracing::debug!(
                        case_study_id = %case.id,
                        "Case study already marked processed by another run"
                    );
                    report.already_claimed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        case_study_id = %case.id,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Skipping case study, it stays unprocessed"
                    );
                    report.failed += 1;
                    report.errors.push(format!("{}: {e}", case.id));
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            processed = report.processed,
            failed = report.failed,
            already_claimed = report.already_claimed,
            duration_ms = report.duration_ms,
            "Extraction phase completed"
        );
        Ok(report)
    }

    /// Extract, store features, then claim the processed flag.
    /// Returns whether this call flipped the flag.
    fn extract_one(&self, conn: &Connection, case: &CaseStudy) -> Result<bool, PipelineError> {
        let features = self.extractor.extract(case)?;
        let record = ExtractedFeatures::new(case.id, features);

        if !self.store.insert_features(conn, &record)? {
            tracing::debug!(
                case_study_id = %case.id,
                "Features already stored, keeping the existing record"
            );
        }

        self.store.mark_processed(conn, &case.id)
    }

    /// Prediction phase.
    pub fn generate_predictions(
        &self,
        conn: &Connection,
    ) -> Result<PredictionReport, PipelineError> {
        let start = Instant::now();

        let processed = self.store.processed_case_studies(conn)?;
        let mut report = PredictionReport {
            candidates: processed.len() as u32,
            ..PredictionReport::empty()
        };
        if processed.is_empty() {
            tracing::warn!("No processed case studies found");
            return Ok(report);
        }
        tracing::info!(candidates = report.candidates, "Prediction phase starting");

        for case in &processed {
            match self.predict_one(conn, case) {
                Ok(PredictOutcome::Created(grade)) => {
                    tracing::info!(case_study_id = %case.id, %grade, "Inserted new prediction");
                    report.created += 1;
                }
                Ok(PredictOutcome::AlreadyExists) => {
                    tracing::debug!(case_study_id = %case.id, "Prediction already exists, skipping");
                    report.already_predicted += 1;
                }
                Err(PipelineError::Conflict(detail)) => {
                    tracing::warn!(
                        case_study_id = %case.id,
                        detail,
                        "Prediction inserted concurrently by another run"
                    );
                    report.already_predicted += 1;
                }
                Ok(PredictOutcome::MissingFeatures) => {
                    tracing::warn!(
                        case_study_id = %case.id,
                        "Case study is processed but has no extracted features, skipping"
                    );
                    report.missing_features += 1;
                }
                Err(e) => {
                    tracing::error!(case_study_id = %case.id, error = %e, "Failed to insert prediction");
                    report.failed += 1;
                    report.errors.push(format!("{}: {e}", case.id));
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            created = report.created,
            already_predicted = report.already_predicted,
            missing_features = report.missing_features,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "Prediction phase completed"
        );
        Ok(report)
    }

    fn predict_one(&self, conn: &Connection, case: &CaseStudy) -> Result<PredictOutcome, PipelineError> {
        if self.store.prediction_exists(conn, &case.id)? {
            return Ok(PredictOutcome::AlreadyExists);
        }

        let Some(features) = self.store.get_features(conn, &case.id)? else {
            return Ok(PredictOutcome::MissingFeatures);
        };

        let grade = grading::grade(&features.features);
        self.store
            .insert_prediction(conn, &Prediction::new(case.id, grade))?;
        Ok(PredictOutcome::Created(grade))
    }
}

enum PredictOutcome {
    Created(Grade),
    AlreadyExists,
    MissingFeatures,
}
