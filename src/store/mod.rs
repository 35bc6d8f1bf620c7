//! Persistence behind one async trait. Each deployment picks an adapter at
//! start-up; nothing above this module knows which one is in use.

pub mod dto;
pub mod file;
pub mod memory;
pub mod remote;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::BoardState;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use remote::{RemoteConfig, RemoteStore};
pub use sqlite::SqliteStore;

#[async_trait]
pub trait BoardStore: Send + Sync {
    /// `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<BoardState>, StoreError>;
    async fn save(&self, state: &BoardState) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
    fn kind(&self) -> &'static str;
}
