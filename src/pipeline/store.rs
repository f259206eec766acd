//! Feature Store Accessor: SQLite implementation.
//!
//! Holds case studies, their extracted features and predictions.
//! UNIQUE(case_study_id) on `extracted_features` and `predictions` is what
//! makes overlapping pipeline runs harmless; the check-then-act gates in the
//! orchestrator only keep the common path quiet.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::error::PipelineError;
use super::traits::FeatureStore;
use crate::db::DatabaseError;
use crate::models::*;

/// SQLite-backed feature store.
pub struct SqliteFeatureStore;

impl SqliteFeatureStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliteFeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

const CASE_STUDY_COLUMNS: &str = "id, text, processed, created_at";
const FEATURE_COLUMNS: &str = "id, case_study_id, features, created_at";
const PREDICTION_COLUMNS: &str = "id, case_study_id, grade, confidence, created_at";

impl FeatureStore for SqliteFeatureStore {
    fn insert_case_study(&self, conn: &Connection, case: &CaseStudy) -> Result<(), PipelineError> {
        conn.execute(
            "INSERT INTO case_studies (id, text, processed, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                case.id.to_string(),
                case.text,
                case.processed as i32,
                format_timestamp(&case.created_at),
            ],
        )
        .map_err(sql_err)?;
        Ok(())
    }

    fn get_case_study(&self, conn: &Connection, id: &Uuid) -> Result<Option<CaseStudy>, PipelineError> {
        let row = conn
            .query_row(
                &format!("SELECT {CASE_STUDY_COLUMNS} FROM case_studies WHERE id = ?1"),
                params![id.to_string()],
                read_case_study_row,
            )
            .optional()
            .map_err(sql_err)?;

        row.map(case_study_from_row).transpose()
    }

    fn unprocessed_case_studies(&self, conn: &Connection) -> Result<Vec<CaseStudy>, PipelineError> {
        self.case_studies_by_flag(conn, false)
    }

    fn count_unprocessed(&self, conn: &Connection) -> Result<u32, PipelineError> {
        let count: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM case_studies WHERE processed = 0",
                [],
                |row| row.get(0),
            )
            .map_err(sql_err)?;
        Ok(count)
    }

    fn processed_case_studies(&self, conn: &Connection) -> Result<Vec<CaseStudy>, PipelineError> {
        self.case_studies_by_flag(conn, true)
    }

    fn insert_features(
        &self,
        conn: &Connection,
        features: &ExtractedFeatures,
    ) -> Result<bool, PipelineError> {
        let features_json = serde_json::to_string(&features.features)
            .map_err(|e| PipelineError::from(DatabaseError::Serialization(e.to_string())))?;

        let changed = conn
            .execute(
                "INSERT INTO extracted_features (id, case_study_id, features, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(case_study_id) DO NOTHING",
                params![
                    features.id.to_string(),
                    features.case_study_id.to_string(),
                    features_json,
                    format_timestamp(&features.created_at),
                ],
            )
            .map_err(sql_err)?;

        Ok(changed == 1)
    }

    fn get_features(
        &self,
        conn: &Connection,
        case_study_id: &Uuid,
    ) -> Result<Option<ExtractedFeatures>, PipelineError> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT {FEATURE_COLUMNS} FROM extracted_features WHERE case_study_id = ?1"
                ),
                params![case_study_id.to_string()],
                |row| {
                    Ok(FeatureRow {
                        id: row.get(0)?,
                        case_study_id: row.get(1)?,
                        features: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(sql_err)?;

        row.map(features_from_row).transpose()
    }

    fn mark_processed(&self, conn: &Connection, case_study_id: &Uuid) -> Result<bool, PipelineError> {
        let changed = conn
            .execute(
                "UPDATE case_studies SET processed = 1 WHERE id = ?1 AND processed = 0",
                params![case_study_id.to_string()],
            )
            .map_err(sql_err)?;
        Ok(changed == 1)
    }

    fn prediction_exists(&self, conn: &Connection, case_study_id: &Uuid) -> Result<bool, PipelineError> {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM predictions WHERE case_study_id = ?1)",
                params![case_study_id.to_string()],
                |row| row.get(0),
            )
            .map_err(sql_err)?;
        Ok(exists)
    }

    fn insert_prediction(&self, conn: &Connection, prediction: &Prediction) -> Result<(), PipelineError> {
        conn.execute(
            "INSERT INTO predictions (id, case_study_id, grade, confidence, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                prediction.id.to_string(),
                prediction.case_study_id.to_string(),
                prediction.grade.as_str(),
                prediction.confidence,
                format_timestamp(&prediction.created_at),
            ],
        )
        .map_err(sql_err)?;
        Ok(())
    }

    fn get_prediction(
        &self,
        conn: &Connection,
        case_study_id: &Uuid,
    ) -> Result<Option<Prediction>, PipelineError> {
        let row = conn
            .query_row(
                &format!("SELECT {PREDICTION_COLUMNS} FROM predictions WHERE case_study_id = ?1"),
                params![case_study_id.to_string()],
                read_prediction_row,
            )
            .optional()
            .map_err(sql_err)?;

        row.map(prediction_from_row).transpose()
    }

    fn list_predictions(&self, conn: &Connection) -> Result<Vec<Prediction>, PipelineError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PREDICTION_COLUMNS} FROM predictions ORDER BY created_at ASC, id ASC"
            ))
            .map_err(sql_err)?;

        let rows = stmt.query_map([], read_prediction_row).map_err(sql_err)?;
        decode_rows(rows, "predictions", |row| row.id.clone(), prediction_from_row)
    }
}

impl SqliteFeatureStore {
    fn case_studies_by_flag(
        &self,
        conn: &Connection,
        processed: bool,
    ) -> Result<Vec<CaseStudy>, PipelineError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {CASE_STUDY_COLUMNS} FROM case_studies
                 WHERE processed = ?1
                 ORDER BY created_at ASC, id ASC"
            ))
            .map_err(sql_err)?;

        let rows = stmt
            .query_map(params![processed as i32], read_case_study_row)
            .map_err(sql_err)?;

        decode_rows(rows, "case_studies", |row| row.id.clone(), case_study_from_row)
    }
}

/// Decode a result set one row at a time. Rows another writer left in a shape
/// this service cannot read are logged and skipped; SQLite failures abort.
fn decode_rows<R, T>(
    rows: impl Iterator<Item = rusqlite::Result<R>>,
    table: &'static str,
    row_id: impl Fn(&R) -> String,
    decode: impl Fn(R) -> Result<T, PipelineError>,
) -> Result<Vec<T>, PipelineError> {
    let mut decoded = Vec::new();
    for row in rows {
        let row = match row {
            Ok(row) => row,
            Err(
                e @ (rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..)),
            ) => {
                tracing::warn!(table, error = %e, "Skipping unreadable row");
                continue;
            }
            Err(e) => return Err(sql_err(e)),
        };
        let id = row_id(&row);
        match decode(row) {
            Ok(item) => decoded.push(item),
            Err(PipelineError::Inconsistent(detail)) => {
                tracing::warn!(table, row_id = %id, error = %detail, "Skipping undecodable row");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(decoded)
}

// ═══════════════════════════════════════════
// Row mapping
// ═══════════════════════════════════════════

struct CaseStudyRow {
    id: String,
    text: String,
    processed: i32,
    created_at: String,
}

struct FeatureRow {
    id: String,
    case_study_id: String,
    features: String,
    created_at: String,
}

struct PredictionRow {
    id: String,
    case_study_id: String,
    grade: String,
    confidence: Option<f64>,
    created_at: String,
}

fn read_case_study_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CaseStudyRow> {
    Ok(CaseStudyRow {
        id: row.get(0)?,
        text: row.get(1)?,
        processed: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn read_prediction_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PredictionRow> {
    Ok(PredictionRow {
        id: row.get(0)?,
        case_study_id: row.get(1)?,
        grade: row.get(2)?,
        confidence: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn case_study_from_row(row: CaseStudyRow) -> Result<CaseStudy, PipelineError> {
    Ok(CaseStudy {
        id: parse_uuid(&row.id)?,
        text: row.text,
        processed: row.processed != 0,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

fn features_from_row(row: FeatureRow) -> Result<ExtractedFeatures, PipelineError> {
    let features: FeatureMap = serde_json::from_str(&row.features)
        .map_err(|e| PipelineError::from(DatabaseError::Serialization(e.to_string())))?;

    Ok(ExtractedFeatures {
        id: parse_uuid(&row.id)?,
        case_study_id: parse_uuid(&row.case_study_id)?,
        features,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

fn prediction_from_row(row: PredictionRow) -> Result<Prediction, PipelineError> {
    let grade: Grade = row.grade.parse()?;
    Ok(Prediction {
        id: parse_uuid(&row.id)?,
        case_study_id: parse_uuid(&row.case_study_id)?,
        grade,
        confidence: row.confidence,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

/// Millisecond RFC 3339 in UTC; sorts lexically in creation order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, PipelineError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            PipelineError::from(DatabaseError::Serialization(format!("bad timestamp {s}: {e}")))
        })
}

fn parse_uuid(s: &str) -> Result<Uuid, PipelineError> {
    Uuid::parse_str(s)
        .map_err(|e| PipelineError::from(DatabaseError::Serialization(format!("bad id {s}: {e}"))))
}

fn sql_err(e: rusqlite::Error) -> PipelineError {
    PipelineError::from(DatabaseError::Sqlite(e))
}
