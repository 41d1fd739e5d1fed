use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected locally before any request was made.
    Validation,
    /// The request did not complete. Sub-causes are not distinguished.
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    Info,
    Success,
    Destructive,
}

/// User-facing toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(
        severity: NoticeSeverity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeSeverity::Success, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeSeverity::Info, title, description)
    }

    pub fn from_failure(failure: &OperationFailure) -> Self {
        let title = match failure.category {
            ErrorCategory::Validation => "Invalid file type",
            ErrorCategory::Transport => "Upload failed",
        };
        Self::new(NoticeSeverity::Destructive, title, failure.message.clone())
    }
}

/// A failure scoped to a single operation. Never fatal to the application.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{category:?}: {message}")]
pub struct OperationFailure {
    pub category: ErrorCategory,
    pub message: String,
}

impl OperationFailure {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Validation,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Transport,
            message: message.into(),
        }
    }
}

impl From<OperationFailure> for Notice {
    fn from(value: OperationFailure) -> Self {
        Notice::from_failure(&value)
    }
}
