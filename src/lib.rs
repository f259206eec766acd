pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod pipeline;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Serve the API until Ctrl-C.
pub async fn run(service: config::ServiceConfig) -> Result<(), String> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let core = Arc::new(core_state::CoreState::new(service.db_path.clone()));

    // The service still starts with a broken store; /status reports it
    match core.open_db() {
        Ok(_) => tracing::info!(db_path = %service.db_path.display(), "Database ready"),
        Err(e) => tracing::error!(
            db_path = %service.db_path.display(),
            error = %e,
            "Database unavailable at startup"
        ),
    }

    let sweep = pipeline::start_periodic_sweep(core.clone(), service.sweep_interval);
    let mut server = api::start_api_server(core, service.bind_addr).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;
    tracing::info!("Shutdown requested");

    if let Some(sweep) = sweep {
        sweep.stop().await;
    }
    server.shutdown();
    server.wait().await;
    Ok(())
}
