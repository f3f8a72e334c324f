//! Error type shared by the API client and the reconciliation helpers.
//!
//! The command layer turns these into user-facing alerts; everything below it
//! propagates `AppError` with `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Local validation rejected the input before any request was made.
    #[error("{0}")]
    Validation(String),

    #[error("Session expired, please log in again")]
    Unauthorized,

    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    /// The server could not be reached or did not answer in time.
    #[error("{0}")]
    Network(String),

    /// Any other failure while sending or receiving a request.
    #[error("{0}")]
    Transport(String),

    #[error("Invalid response from server: {0}")]
    Decode(String),

    #[error("Credential store error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Connect and timeout failures only; safe to retry for reads.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<keyring::Error> for AppError {
    fn from(err: keyring::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
