//! Background task runner and periodic sweep.
//!
//! Wraps both pipeline phases so a trigger returns immediately. The phases
//! do blocking SQLite I/O, so they run on tokio's blocking pool. Errors and
//! panics are logged here and never reach the caller.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core_state::CoreState;

/// Fire-and-forget entry points for the two phases.
#[derive(Clone)]
pub struct BackgroundRunner {
    state: Arc<CoreState>,
}

impl BackgroundRunner {
    pub fn new(state: Arc<CoreState>) -> Self {
        Self { state }
    }

    /// Run the extraction phase in the background.
    pub fn spawn_extraction(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        spawn_logged("extraction", move || run_extraction(&state))
    }

    /// Run the prediction phase in the background.
    pub fn spawn_predictions(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        spawn_logged("prediction", move || run_predictions(&state))
    }
}

fn run_extraction(state: &CoreState) -> Result<(), String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    state
        .runner()
        .process_pending_case_studies(&conn)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn run_predictions(state: &CoreState) -> Result<(), String> {
    let conn = state.open_db().map_err(|e| e.to_string())?;
    state
        .runner()
        .generate_predictions(&conn)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Spawn `job` on the blocking pool; the outer task observes its outcome.
fn spawn_logged<F>(phase: &'static str, job: F) -> JoinHandle<()>
where
    F: FnOnce() -> Result<(), String> + Send + 'static,
{
    tokio::spawn(async move {
        match tokio::task::spawn_blocking(job).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(phase, error = %e, "Background phase failed"),
            Err(e) if e.is_panic() => {
                tracing::error!(phase, error = %e, "Background phase panicked")
            }
            Err(e) => tracing::warn!(phase, error = %e, "Background phase cancelled"),
        }
    })
}

/// Handle for the periodic sweep task.
///
/// Dropping the handle stops the sweep; a sweep already running finishes.
pub struct SweepHandle {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Request shutdown. No new sweep starts after this.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Request shutdown and wait for the task to exit.
    pub async fn stop(mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start a task that runs extraction then prediction every `interval`.
///
/// Returns `None` when `interval` is zero (sweep disabled).
pub fn start_periodic_sweep(state: Arc<CoreState>, interval: Duration) -> Option<SweepHandle> {
    if interval.is_zero() {
        tracing::debug!("Periodic sweep disabled");
        return None;
    }

    let (tx, mut rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Periodic sweep started");
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = rx.changed() => {
                    if changed.is_err() || *rx.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let state = state.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                run_extraction(&state)?;
                run_predictions(&state)
            })
            .await;
            match outcome {
                Ok(Ok(())) => tracing::debug!("Sweep completed"),
                Ok(Err(e)) => tracing::warn!(error = %e, "Sweep failed"),
                Err(e) => tracing::error!(error = %e, "Sweep task panicked"),
            }
        }
        tracing::info!("Periodic sweep shutting down");
    });

    Some(SweepHandle {
        shutdown: tx,
        handle: Some(handle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use crate::pipeline::{FeatureExtractor, PipelineError, PipelineRunner, SqliteFeatureStore};

    struct PanickingExtractor;

    impl FeatureExtractor for PanickingExtractor {
        fn extract(&self, _case: &CaseStudy) -> Result<FeatureMap, PipelineError> {
            panic!("extractor blew up");
        }
    }

    fn temp_state(dir: &tempfile::TempDir) -> Arc<CoreState> {
        Arc::new(CoreState::new(dir.path().join("bg.db")))
    }

    fn seed(state: &CoreState, texts: &[&str]) -> Vec<CaseStudy> {
        let conn = state.open_db().unwrap();
        texts
            .iter()
            .map(|t| {
                let case = CaseStudy::new(*t);
                state.store().insert_case_study(&conn, &case).unwrap();
                case
            })
            .collect()
    }

    #[tokio::test]
    async fn extraction_then_predictions_in_background() {
        let tmp = tempfile::tempdir().unwrap();
        let state = temp_state(&tmp);
        let cases = seed(
            &state,
            &["Patient with pneumonia given amoxicillin", "Routine visit"],
        );
        let runner = BackgroundRunner::new(state.clone());

        runner.spawn_extraction().await.unwrap();
        runner.spawn_predictions().await.unwrap();

        let conn = state.open_db().unwrap();
        for case in &cases {
            let prediction = state.store().get_prediction(&conn, &case.id).unwrap();
            assert!(prediction.is_some());
        }
    }

    #[tokio::test]
    async fn failure_is_logged_not_propagated() {
        let tmp = tempfile::tempdir().unwrap();
        // Parent path is a file, so opening the database fails
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let state = Arc::new(CoreState::new(blocker.join("bg.db")));

        let runner = BackgroundRunner::new(state);
        assert!(runner.spawn_extraction().await.is_ok());
        assert!(runner.spawn_predictions().await.is_ok());
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = PipelineRunner::new(
            Box::new(SqliteFeatureStore::new()),
            Box::new(PanickingExtractor),
        );
        let state = Arc::new(CoreState::with_runner(tmp.path().join("bg.db"), runner));
        let cases = seed(&state, &["anything"]);

        assert!(BackgroundRunner::new(state.clone()).spawn_extraction().await.is_ok());

        let conn = state.open_db().unwrap();
        let case = state.store().get_case_study(&conn, &cases[0].id).unwrap().unwrap();
        assert!(!case.processed);
    }

    #[tokio::test]
    async fn zero_interval_disables_sweep() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(start_periodic_sweep(temp_state(&tmp), Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn sweep_grades_new_case_studies() {
        let tmp = tempfile::tempdir().unwrap();
        let state = temp_state(&tmp);
        let cases = seed(&state, &["Asthma treated with salbutamol and nebulization"]);

        let sweep = start_periodic_sweep(state.clone(), Duration::from_millis(20)).unwrap();

        let mut graded = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let conn = state.open_db().unwrap();
            if state.store().get_prediction(&conn, &cases[0].id).unwrap().is_some() {
                graded = true;
                break;
            }
        }
        sweep.stop().await;
        assert!(graded);
    }

    #[tokio::test]
    async fn stop_ends_the_task() {
        let tmp = tempfile::tempdir().unwrap();
        let sweep = start_periodic_sweep(temp_state(&tmp), Duration::from_secs(3600)).unwrap();
        tokio::time::timeout(Duration::from_secs(5), sweep.stop())
            .await
            .unwrap();
    }
}
