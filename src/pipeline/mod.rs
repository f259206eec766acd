//! Case-study grading pipeline.
//!
//! ```text
//! unprocessed case study
//!   → FeatureExtractor (text → FeatureMap)
//!   → FeatureStore.insert_features, mark_processed
//!   → grading::grade (FeatureMap → O / A / B)
//!   → FeatureStore.insert_prediction
//! ```
//!
//! Both phases are safe to run concurrently with themselves: claim gates in
//! the orchestrator plus UNIQUE(case_study_id) in the store keep every case
//! study at one features record and at most one prediction.

pub mod background;
pub mod error;
pub mod extractor;
pub mod grading;
pub mod orchestrator;
pub mod store;
pub mod traits;
pub mod types;

pub use background::{start_periodic_sweep, BackgroundRunner, SweepHandle};
pub use error::PipelineError;
pub use extractor::KeywordFeatureExtractor;
pub use orchestrator::PipelineRunner;
pub use store::SqliteFeatureStore;
pub use traits::{FeatureExtractor, FeatureStore};
pub use types::{ExtractionReport, PredictionReport};
