use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Rejections raised by the command reducer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Section \"{0}\" is a default section and cannot be deleted")]
    DefaultSectionProtected(String),

    #[error("Cannot delete \"{name}\" because it contains {count} todo(s)")]
    SectionNotEmpty { name: String, count: usize },

    #[error("Unknown section: {0}")]
    UnknownSection(String),

    #[error("Unknown team member: {0}")]
    UnknownMember(String),

    #[error("Member with email {0} already exists")]
    DuplicateMember(String),

    #[error("Invalid import: {0}")]
    InvalidImport(String),
}

impl BoardError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        BoardError::NotFound { kind, id: id.into() }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote store error: {0}")]
    Http(String),

    #[error("Corrupt stored data: {0}")]
    Corrupt(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Http(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Board(e) => {
                let status = match &e {
                    BoardError::NotFound { .. } => StatusCode::NOT_FOUND,
                    BoardError::Validation(_)
                    | BoardError::UnknownSection(_)
                    | BoardError::UnknownMember(_)
                    | BoardError::InvalidImport(_) => StatusCode::BAD_REQUEST,
                    BoardError::DefaultSectionProtected(_)
                    | BoardError::SectionNotEmpty { .. }
                    | BoardError::DuplicateMember(_) => StatusCode::CONFLICT,
                };
                (status, e.to_string())
            }
            AppError::Store(e) => {
                error!("storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error occurred".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
