use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::fs;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::export;
use crate::services::BoardService;

/// Writes a dated export of the board on a fixed interval.
pub struct BackupScheduler {
    service: Arc<BoardService>,
    dir: PathBuf,
    interval: Duration,
}

impl BackupScheduler {
    pub fn new(service: Arc<BoardService>, dir: impl Into<PathBuf>, interval_secs: u64) -> Self {
        Self {
            service,
            dir: dir.into(),
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs until the task is aborted.
    pub async fn start(self) {
        info!(
            "Starting backup scheduler (interval: {:?}, dir: {})",
            self.interval,
            self.dir.display()
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match self.run_backup().await {
                Ok(path) => info!("Backup written to {}", path.display()),
                // keep looping; the next tick may succeed
                Err(e) => warn!("Backup failed: {:?}", e),
            }
        }
    }

    pub async fn run_backup(&self) -> Result<PathBuf, StoreError> {
        let state = self.service.snapshot().await;
        let body = export::export_json(&state)?;
        let path = self.dir.join(export::backup_file_name(Utc::now().date_naive()));
        write_atomically(&path, &body).await?;
        Ok(path)
    }
}

async fn write_atomically(path: &Path, body: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
