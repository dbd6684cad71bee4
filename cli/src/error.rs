//! Error handling for the sales register tool

use shared::{Notification, RegisterError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Destructive action attempted without explicit confirmation
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),
}

impl AppError {
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Message shown to the operator
    pub fn notification(&self) -> Notification {
        match self {
            AppError::Register(err) => err.notification(),
            AppError::ConfirmationRequired(msg) => Notification::warning(msg.clone()),
            other => Notification::error(other.to_string()),
        }
    }
}

/// Result type alias for commands
pub type AppResult<T> = Result<T, AppError>;
