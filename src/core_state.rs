//! Shared service state.
//!
//! `CoreState` is wrapped in `Arc` at startup and shared by the HTTP
//! handlers, the background runner and the periodic sweep. It owns the
//! database location and the pipeline pieces; every caller opens its own
//! connection so no lock is held across store I/O.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::pipeline::{FeatureStore, PipelineRunner};

pub struct CoreState {
    db_path: PathBuf,
    runner: PipelineRunner,
}

impl CoreState {
    /// State over the SQLite file at `db_path` with the default pipeline.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self::with_runner(db_path, PipelineRunner::with_defaults())
    }

    pub fn with_runner(db_path: impl Into<PathBuf>, runner: PipelineRunner) -> Self {
        Self {
            db_path: db_path.into(),
            runner,
        }
    }

    /// Open a connection to the service database (migrations applied).
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    /// Check that the database is reachable and migrated. Never creates
    /// the file or applies migrations.
    pub fn check_store(&self) -> Result<i64, CoreError> {
        let conn = db::open_existing(&self.db_path)?;
        Ok(db::ping(&conn)?)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn runner(&self) -> &PipelineRunner {
        &self.runner
    }

    pub fn store(&self) -> &dyn FeatureStore {
        self.runner.store()
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
