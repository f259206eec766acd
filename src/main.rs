use clinassign_lib::config::ServiceConfig;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    clinassign_lib::init_tracing();

    let service = ServiceConfig::from_env();
    if let Err(e) = clinassign_lib::run(service).await {
        tracing::error!(error = %e, "Service failed");
        std::process::exit(1);
    }
}
