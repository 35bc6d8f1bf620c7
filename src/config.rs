use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::AppError;
use crate::store::{BoardStore, JsonFileStore, MemoryStore, RemoteConfig, RemoteStore, SqliteStore};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite { database_url: String },
    File { path: PathBuf },
    Memory,
    Remote {
        base_url: String,
        document: String,
        api_token: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    pub backup_dir: Option<PathBuf>,
    pub backup_interval_secs: u64,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let backend = get("STORAGE_BACKEND").unwrap_or_else(|| "sqlite".to_string());
        let storage = match backend.as_str() {
            "sqlite" => StorageBackend::Sqlite {
                database_url: get("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite://teamboard.db".to_string()),
            },
            "file" => StorageBackend::File {
                path: get("DATA_FILE")
                    .unwrap_or_else(|| "teamboard.json".to_string())
                    .into(),
            },
            "memory" => StorageBackend::Memory,
            "remote" => StorageBackend::Remote {
                base_url: get("REMOTE_URL")
                    .ok_or_else(|| AppError::Config("REMOTE_URL is not set".to_string()))?,
                document: get("REMOTE_DOCUMENT").unwrap_or_else(|| "teamTodoApp".to_string()),
                api_token: get("REMOTE_TOKEN"),
            },
            other => {
                return Err(AppError::Config(format!(
                    "STORAGE_BACKEND must be one of sqlite, file, memory, remote (got {})",
                    other
                )));
            }
        };

        let backup_interval_secs = match get("BACKUP_INTERVAL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    AppError::Config(format!("BACKUP_INTERVAL_SECS is invalid: {}", raw))
                })?,
            None => 3600,
        };

        Ok(Self {
            bind_addr,
            storage,
            backup_dir: get("BACKUP_DIR").map(PathBuf::from),
            backup_interval_secs,
        })
    }

    pub async fn open_store(&self) -> Result<Arc<dyn BoardStore>, AppError> {
        let store: Arc<dyn BoardStore> = match &self.storage {
            StorageBackend::Sqlite { database_url } => {
                Arc::new(SqliteStore::connect(database_url).await?)
            }
            StorageBackend::File { path } => Arc::new(JsonFileStore::new(path.clone())),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Remote {
                base_url,
                document,
                api_token,
            } => Arc::new(RemoteStore::new(RemoteConfig {
                base_url: base_url.clone(),
                document: document.clone(),
                api_token: api_token.clone(),
            })?),
        };
        Ok(store)
    }
}
