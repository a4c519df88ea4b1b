//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run the transport.
//! No business logic here.

use dotenv::dotenv;
use rating_service::adapters::cli::JsonLinesInput;
use rating_service::adapters::persistence::LibsqlRatingRepo;
use rating_service::adapters::protocol::RatingHandler;
use rating_service::ports::{InputPort, RatingRepoPort};
use rating_service::shared::config::AppConfig;
use rating_service::shared::logging::init_tracing;
use rating_service::usecases::{AsyncDispatcher, RatingService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Instrument, info, info_span};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    let cfg = AppConfig::load().unwrap_or_default();
    init_tracing(&cfg.log_level_or_default());

    let root = info_span!(
        "service",
        service = cfg.service_name_or_default(),
        environment = cfg.environment_or_default(),
    );
    async move {
        match &env_loaded {
            Ok(path) => info!(path = %path.display(), "loaded .env"),
            Err(_) => info!("no .env found (check CWD)"),
        }
        run(cfg).await
    }
    .instrument(root)
    .await
}

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let repo: Arc<dyn RatingRepoPort> = Arc::new(
        LibsqlRatingRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("database connect failed: {}", e))?,
    );

    // --- Worker pool (bounded; excess work queues for a permit) ---
    let worker_threads = cfg.worker_threads_or_default();
    info!(worker_threads, "worker pool size: {}", worker_threads);
    let dispatcher = AsyncDispatcher::new(tokio::runtime::Handle::current(), worker_threads);

    // --- Service and protocol handler ---
    let service = Arc::new(RatingService::new(repo, dispatcher));
    let handler = Arc::new(RatingHandler::new(service));

    // --- Transport (JSON lines on stdin/stdout) ---
    let input: Arc<dyn InputPort> = Arc::new(JsonLinesInput::new(handler));
    input.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("shutting down");
    Ok(())
}
