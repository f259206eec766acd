//! Shared types for the HTTP layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::pipeline::BackgroundRunner;

/// Shared context for all routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub background: BackgroundRunner,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            background: BackgroundRunner::new(core.clone()),
            core,
        }
    }
}

/// Plain `{message}` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
