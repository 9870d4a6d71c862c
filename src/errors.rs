use std::env::VarError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),
}

/// Failure reported by the document store's HTTP API.
#[derive(Debug, Error)]
#[error("{message} (code {code}, errorNum {error_num})")]
pub struct DatabaseError {
    pub code: u16,
    pub error_num: i64,
    pub message: String,
}

/// errorNum used by the document store for "duplicate name" on create.
pub const ERROR_DUPLICATE_NAME: i64 = 1207;
/// errorNum for "unique constraint violated", also sent with a 409.
pub const ERROR_UNIQUE_CONSTRAINT_VIOLATED: i64 = 1210;

impl DatabaseError {
    // Only the errorNum tells a name clash apart from other conflicts.
    pub fn is_duplicate_name(&self) -> bool {
        self.error_num == ERROR_DUPLICATE_NAME
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
