use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No sessions directory found.")]
    NoSessionRoots,
    #[error("Invalid window: end ({end}) must be after start ({start}).")]
    InvalidWindow { start: String, end: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    /// Errors the caller can fix by changing roots or request parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AppError::NoSessionRoots | AppError::InvalidWindow { .. } | AppError::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match err {
            AppError::NoSessionRoots => (400, Some("no_sessions".to_string())),
            AppError::InvalidWindow { .. } => (400, Some("invalid_window".to_string())),
            AppError::InvalidInput(_) => (400, Some("invalid_input".to_string())),
            AppError::NotFound(_) => (404, Some("not_found".to_string())),
            AppError::Io(_) | AppError::Serde(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code,
        }
    }
}
