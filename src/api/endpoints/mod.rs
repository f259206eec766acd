//! API endpoint handlers, one module per resource.

pub mod case_studies;
pub mod health;
pub mod pipeline;
pub mod predictions;
