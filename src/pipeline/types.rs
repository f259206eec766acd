use serde::{Deserialize, Serialize};

/// Outcome of one extraction-phase run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Unprocessed case studies seen at the start of the run.
    pub eligible: u32,
    /// Case studies this run extracted and marked processed.
    pub processed: u32,
    /// Extraction or write failures; these stay eligible for the next run.
    pub failed: u32,
    /// Features written, but another run had already flipped the flag.
    pub already_claimed: u32,
    pub duration_ms: u64,
    pub errors: Vec<String>,
}

impl ExtractionReport {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Outcome of one prediction-phase run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Processed case studies seen at the start of the run.
    pub candidates: u32,
    pub created: u32,
    /// Skipped because a prediction existed, including inserts that lost a
    /// race against a concurrent run.
    pub already_predicted: u32,
    /// Processed case studies with no features record (inconsistent state).
    pub missing_features: u32,
    /// Lookups or inserts that failed for any other reason.
    pub failed: u32,
    pub duration_ms: u64,
    pub errors: Vec<String>,
}

impl PredictionReport {
    pub fn empty() -> Self {
        Self::default()
    }
}
