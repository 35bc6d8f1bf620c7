use std::sync::Arc;

use crate::services::BoardService;

#[derive(Clone)]
pub struct AppState {
    pub board: Arc<BoardService>,
}
