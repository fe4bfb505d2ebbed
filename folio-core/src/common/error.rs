use crate::validation::FieldErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{0}")]
    Conflict(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {message}")]
    Database { message: String },
}

impl FolioError {
    pub fn not_found(entity: &'static str) -> Self {
        FolioError::NotFound { entity }
    }

    pub fn database(message: impl Into<String>) -> Self {
        FolioError::Database {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
