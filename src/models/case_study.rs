use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Prediction;

/// A free-text clinical narrative submitted for grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub id: Uuid,
    pub text: String,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

impl CaseStudy {
    /// New unprocessed record stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            processed: false,
            created_at: super::timestamp_now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCaseStudy {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudyWithPrediction {
    pub case_study: CaseStudy,
    pub prediction: Option<Prediction>,
}
