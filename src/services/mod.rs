pub mod backup;
pub mod board_service;

pub use backup::BackupScheduler;
pub use board_service::BoardService;
