//! HTTP API.
//!
//! Ingests case studies, triggers the two pipeline phases in the
//! background, and serves grades. `api_router()` returns a `Router` that
//! can be mounted on any axum server; `start_api_server()` runs it.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
