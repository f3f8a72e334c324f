//! Screen actions.
//!
//! Each function here is one button on a sales screen: validate
//! locally, talk to the backend, and report back. Success carries a JSON
//! payload (with a `message` when the user should see a confirmation);
//! failure carries the [`Alert`] to show.

use serde::Serialize;
use tracing::error;

use crate::error::AppError;

pub mod auth;
pub mod documents;
pub mod enquiries;
pub mod kits;
pub mod lots;
pub mod orders;

/// A blocking dialog for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new("Invalid", message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Map a failed action to its dialog. Validation problems are shown as-is;
/// anything that went wrong on the wire is logged and replaced by `fallback`.
pub(crate) fn failure(action: &str, fallback: &str, err: AppError) -> Alert {
    match err {
        AppError::Validation(message) => Alert::invalid(message),
        AppError::Unauthorized => {
            Alert::new("Session expired", "Your session has expired. Please log in again.")
        }
        other => {
            error!(action, error = %other, "action failed");
            Alert::error(fallback)
        }
    }
}

/// Non-empty, trimmed identifier or an `Invalid` alert naming the field.
pub(crate) fn require(value: Option<&str>, what: &str) -> Result<String, Alert> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Alert::invalid(format!("Missing {what}")))
}
