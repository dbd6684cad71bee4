//! Error taxonomy for the sales register
//!
//! Corrupt persisted state never appears here: it is recovered inside the
//! store by starting from an empty collection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Notification;

/// Sales register errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// Required field missing or a field rule failed; the form stays as entered
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    /// The key-value backend failed to read or write the collection
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("No sales data to export")]
    EmptyExport,

    #[error("Sales entry {0} not found")]
    NotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RegisterError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RegisterError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RegisterError::Validation { .. } => "VALIDATION_ERROR",
            RegisterError::Persistence(_) => "PERSISTENCE_ERROR",
            RegisterError::EmptyExport => "EMPTY_EXPORT",
            RegisterError::NotFound(_) => "NOT_FOUND",
            RegisterError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Structured body handed to the dashboard
    pub fn detail(&self) -> ErrorDetail {
        let (message, field) = match self {
            RegisterError::Validation { field, message } => (message.clone(), Some(field.clone())),
            RegisterError::Persistence(_) => ("Error saving sales entry".to_string(), None),
            RegisterError::EmptyExport => ("No sales data to export".to_string(), None),
            RegisterError::NotFound(id) => (format!("Sales entry {} not found", id), None),
            RegisterError::Serialization(_) => ("Error exporting sales data".to_string(), None),
        };
        ErrorDetail {
            code: self.code().to_string(),
            message,
            field,
        }
    }

    /// Toast shown to the user for this failure
    pub fn notification(&self) -> Notification {
        Notification::error(self.detail().message)
    }
}

impl From<serde_json::Error> for RegisterError {
    fn from(err: serde_json::Error) -> Self {
        RegisterError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for RegisterError {
    fn from(err: csv::Error) -> Self {
        RegisterError::Serialization(format!("CSV serialization error: {}", err))
    }
}

/// Serializable error body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Result type alias for register operations
pub type RegisterResult<T> = Result<T, RegisterError>;
