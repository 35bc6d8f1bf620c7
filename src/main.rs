use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use teamboard::api::router;
use teamboard::config::AppConfig;
use teamboard::services::{BackupScheduler, BoardService};
use teamboard::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "teamboard=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let store = config.open_store().await?;
    let board = Arc::new(BoardService::open(store).await?);

    if let Some(dir) = &config.backup_dir {
        let scheduler = BackupScheduler::new(board.clone(), dir.clone(), config.backup_interval_secs);
        tokio::spawn(scheduler.start());
    }

    let app = router(AppState { board });

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
