//! Status label texts and the update record written on every transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{DispatchId, DispatchPhase, KeyValue},
    error::DispatchError,
};

pub const IDLE_TEXT: &str = "Select a key.";
pub const SENDING_TEXT: &str = "Sending command...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub phase: DispatchPhase,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch_id: Option<DispatchId>,
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    fn new(phase: DispatchPhase, text: String, dispatch_id: Option<DispatchId>) -> Self {
        Self {
            phase,
            text,
            dispatch_id,
            at: Utc::now(),
        }
    }

    pub fn idle() -> Self {
        Self::new(DispatchPhase::Idle, IDLE_TEXT.to_string(), None)
    }

    pub fn selected(dispatch_id: DispatchId, key: &KeyValue) -> Self {
        Self::new(
            DispatchPhase::Selected,
            format!("Key {key} selected."),
            Some(dispatch_id),
        )
    }

    pub fn sending(dispatch_id: DispatchId) -> Self {
        Self::new(
            DispatchPhase::Pending,
            SENDING_TEXT.to_string(),
            Some(dispatch_id),
        )
    }

    pub fn responded(dispatch_id: DispatchId, message: &str) -> Self {
        Self::new(
            DispatchPhase::Succeeded,
            format!("Response from device: {message}"),
            Some(dispatch_id),
        )
    }

    pub fn failed(dispatch_id: DispatchId, err: &DispatchError) -> Self {
        let text = match err {
            DispatchError::Http { status_text, .. } => format!("Connection error: {status_text}"),
            DispatchError::Transport(message)
            | DispatchError::Decode(message)
            | DispatchError::InvalidEndpoint(message) => format!("Network error: {message}"),
        };
        Self::new(err.phase(), text, Some(dispatch_id))
    }
}

impl Default for StatusUpdate {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> KeyValue {
        KeyValue::parse(raw).expect("key")
    }

    #[test]
    fn selected_and_response_texts() {
        let id = DispatchId::new();
        assert_eq!(StatusUpdate::selected(id, &key("4")).text, "Key 4 selected.");
        assert_eq!(StatusUpdate::sending(id).text, "Sending command...");
        assert_eq!(
            StatusUpdate::responded(id, "OK").text,
            "Response from device: OK"
        );
    }

    #[test]
    fn http_failure_uses_status_text() {
        let update = StatusUpdate::failed(
            DispatchId::new(),
            &DispatchError::http(500, "Internal Server Error"),
        );
        assert_eq!(update.phase, DispatchPhase::HttpError);
        assert_eq!(update.text, "Connection error: Internal Server Error");
    }

    #[test]
    fn transport_and_decode_failures_read_as_network_errors() {
        let id = DispatchId::new();
        let refused =
            StatusUpdate::failed(id, &DispatchError::Transport("connection refused".into()));
        assert_eq!(refused.phase, DispatchPhase::NetworkError);
        assert_eq!(refused.text, "Network error: connection refused");

        let decode = StatusUpdate::failed(id, &DispatchError::Decode("expected value".into()));
        assert_eq!(decode.text, "Network error: expected value");
    }

    #[test]
    fn default_is_idle_without_dispatch() {
        let update = StatusUpdate::default();
        assert_eq!(update.phase, DispatchPhase::Idle);
        assert_eq!(update.dispatch_id, None);
    }
}
