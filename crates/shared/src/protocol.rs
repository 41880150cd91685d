use serde::{Deserialize, Serialize};

use crate::domain::KeyValue;

pub const CONTROL_PATH: &str = "/control";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlQuery {
    pub key: KeyValue,
}

/// Success body returned by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_response_ignores_extra_fields() {
        let response: ControlResponse =
            serde_json::from_str(r#"{"message":"Sequence 3 started.","led":3}"#).expect("decode");
        assert_eq!(response.message, "Sequence 3 started.");
    }

    #[test]
    fn control_response_requires_message() {
        assert!(serde_json::from_str::<ControlResponse>(r#"{"status":"ok"}"#).is_err());
    }

    #[test]
    fn control_query_rejects_blank_key() {
        assert!(serde_json::from_str::<ControlQuery>(r#"{"key":""}"#).is_err());
    }
}
