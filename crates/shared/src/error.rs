use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DispatchPhase;

/// Why a dispatch did not end with a device message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DispatchError {
    /// The device answered with a non-success status.
    #[error("device returned HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },
    /// No response came back at all.
    #[error("{0}")]
    Transport(String),
    /// A success response whose body was not `{"message": "<string>"}`.
    /// A missing or non-string `message` lands here too, so the label shows
    /// `Network error: ...` rather than a response line.
    #[error("{0}")]
    Decode(String),
    #[error("invalid device endpoint {0}")]
    InvalidEndpoint(String),
}

impl DispatchError {
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
        }
    }

    pub fn phase(&self) -> DispatchPhase {
        match self {
            DispatchError::Http { .. } => DispatchPhase::HttpError,
            DispatchError::Transport(_)
            | DispatchError::Decode(_)
            | DispatchError::InvalidEndpoint(_) => DispatchPhase::NetworkError,
        }
    }
}
