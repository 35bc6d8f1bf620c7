use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BoardStore;
use crate::error::StoreError;
use crate::models::BoardState;

/// Process-local store. Stands in for a backing service in tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<Option<BoardState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: BoardState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
        }
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn load(&self) -> Result<Option<BoardState>, StoreError> {
        Ok(self.state.read().await.clone())
    }

    async fn save(&self, state: &BoardState) -> Result<(), StoreError> {
        *self.state.write().await = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.state.write().await = None;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
