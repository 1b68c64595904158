use alert_logger::infrastructure::logging;
use alert_logger::repositories::MongoLogRepository;
use alert_logger::{AppState, Config, router};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let _log_guard = logging::init(config.log_dir.as_deref());

    let log_repo = MongoLogRepository::connect(&config).await?;
    if let Err(e) = log_repo.ensure_indexes().await {
        tracing::warn!(error = %e, "could not create indexes");
    }
    tracing::info!(
        database = %config.database,
        collection = %config.collection,
        "log store ready"
    );

    let app = router(AppState::new(Arc::new(log_repo)), &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
