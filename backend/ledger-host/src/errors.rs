//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Corrupt ledger record: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, HostError>;
