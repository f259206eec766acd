//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! CORS is permissive: the web front-end is served from another origin.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the service router over shared state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::welcome))
        .route("/status", get(endpoints::health::status))
        .route("/case_studies/", post(endpoints::case_studies::create))
        .route(
            "/case_studies/unprocessed",
            get(endpoints::case_studies::unprocessed),
        )
        .route(
            "/case_studies/:id/with_prediction",
            get(endpoints::case_studies::with_prediction),
        )
        .route(
            "/process_case_studies/",
            post(endpoints::pipeline::process_case_studies),
        )
        .route("/train_model/", post(endpoints::pipeline::train_model))
        .route("/predictions", get(endpoints::predictions::list))
        .route("/predictions/:id", get(endpoints::predictions::for_case_study))
        .with_state(ctx)
        .layer(CorsLayer::permissive())
}
