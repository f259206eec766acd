use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Grade;

/// At most one per case study; enforced by the store's UNIQUE constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub case_study_id: Uuid,
    pub grade: Grade,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(case_study_id: Uuid, grade: Grade) -> Self {
        Self {
            id: Uuid::new_v4(),
            case_study_id,
            grade,
            confidence: None,
            created_at: super::timestamp_now(),
        }
    }
}
