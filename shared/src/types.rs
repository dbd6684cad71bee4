//! Common types used across the register

use serde::{Deserialize, Serialize};

/// How long a toast stays on screen before dismissing itself
pub const NOTIFICATION_TIMEOUT_MS: u32 = 3000;

/// Default storage slot holding the serialized record collection
pub const SALES_DATA_KEY: &str = "salesData";

/// Severity of a user notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Success,
    Error,
    Warning,
}

impl NotificationLevel {
    /// Toast background color
    pub fn color(&self) -> &'static str {
        match self {
            NotificationLevel::Success => "#10b981",
            NotificationLevel::Error => "#ef4444",
            NotificationLevel::Warning => "#f59e0b",
        }
    }
}

/// Transient, auto-dismissing message shown after an action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn entry_saved() -> Self {
        Self::success("Sales entry saved successfully")
    }

    pub fn entry_saved_and_printed() -> Self {
        Self::success("Sales entry saved and printed successfully")
    }

    pub fn entry_deleted() -> Self {
        Self::success("Sales entry deleted successfully")
    }

    pub fn exported() -> Self {
        Self::success("Sales data exported successfully")
    }
}
