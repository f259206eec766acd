use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single extracted attribute: a count/measurement or a categorical label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view used for scoring. Text values have none.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(n) => Some(*n),
            FeatureValue::Text(_) => None,
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(n: f64) -> Self {
        FeatureValue::Number(n)
    }
}

impl From<u32> for FeatureValue {
    fn from(n: u32) -> Self {
        FeatureValue::Number(f64::from(n))
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Text(s.to_string())
    }
}

/// Named attributes derived from one case study. Ordered so the stored JSON
/// is stable across runs.
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// One per case study, written once by the extraction phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFeatures {
    pub id: Uuid,
    pub case_study_id: Uuid,
    pub features: FeatureMap,
    pub created_at: DateTime<Utc>,
}

impl ExtractedFeatures {
    pub fn new(case_study_id: Uuid, features: FeatureMap) -> Self {
        Self {
            id: Uuid::new_v4(),
            case_study_id,
            features,
            created_at: super::timestamp_now(),
        }
    }
}
