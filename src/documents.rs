//! QC and dispatch documents attached to an order.
//!
//! Documents are append-only on the backend; removal is a soft delete.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;
use crate::models::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Qc,
    Dispatch,
}

impl DocumentKind {
    /// Collection path relative to the API base.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Qc => "qc-docs/",
            Self::Dispatch => "dispatch-docs/",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Qc => "QC Documents",
            Self::Dispatch => "Dispatch Documents",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qc => f.write_str("qc"),
            Self::Dispatch => f.write_str("dispatch"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qc" => Ok(Self::Qc),
            "dispatch" => Ok(Self::Dispatch),
            _ => Err(AppError::validation(format!(
                "Unknown document kind: {s} (expected qc or dispatch)"
            ))),
        }
    }
}

/// Documents that have not been soft-deleted, in backend order.
pub fn active(docs: Vec<Document>) -> Vec<Document> {
    docs.into_iter().filter(|d| !d.is_deleted()).collect()
}
