use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::{error::DispatchError, protocol::CONTROL_PATH};

pub const DEFAULT_DEVICE_HOST: &str = "192.168.100.14";

macro_rules! string_newtype {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyValueError {
    #[error("key value must not be empty")]
    Empty,
    #[error("key value {0:?} must not contain whitespace")]
    Whitespace(String),
}

/// Identifier sent to the device as the `key` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyValue(String);

string_newtype!(KeyValue);

impl KeyValue {
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyValueError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(KeyValueError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(KeyValueError::Whitespace(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KeyValue {
    type Error = KeyValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<KeyValue> for String {
    fn from(value: KeyValue) -> Self {
        value.0
    }
}

/// One activatable element of the keypad. `value` is `None` when the
/// layout declares a key without a value attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    #[serde(default)]
    pub value: Option<KeyValue>,
    #[serde(default)]
    pub label: String,
}

impl Key {
    pub fn new(value: KeyValue, label: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            label: label.into(),
        }
    }

    pub fn without_value(label: impl Into<String>) -> Self {
        Self {
            value: None,
            label: label.into(),
        }
    }

    /// Text shown on the key face.
    pub fn caption(&self) -> &str {
        match &self.value {
            Some(value) => value.as_str(),
            None => "?",
        }
    }
}

/// LED sequences understood by the stock firmware, in keypad order.
pub fn default_keypad() -> Vec<Key> {
    [
        ("1", "Left to right"),
        ("2", "Right to left"),
        ("3", "Center outwards"),
        ("4", "Edges inwards"),
        ("5", "VU meter"),
        ("6", "Even LEDs"),
        ("7", "Odd LEDs"),
        ("8", "Blink all"),
        ("9", "All off"),
    ]
    .into_iter()
    .map(|(value, label)| Key {
        value: Some(KeyValue(value.to_string())),
        label: label.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceHostError {
    #[error("device host must not be empty")]
    Empty,
    #[error("device host {0:?} must be a bare host or host:port, without scheme or path")]
    NotBare(String),
    #[error("device host {host:?} is not a valid address: {reason}")]
    Invalid { host: String, reason: String },
}

/// Network address of the controlled board, as `host` or `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceHost(String);

string_newtype!(DeviceHost);

impl DeviceHost {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DeviceHostError> {
        let raw = raw.into();
        let host = raw.trim();
        if host.is_empty() {
            return Err(DeviceHostError::Empty);
        }
        if host.contains("://")
            || host.contains('/')
            || host.contains('?')
            || host.chars().any(char::is_whitespace)
        {
            return Err(DeviceHostError::NotBare(raw));
        }

        let base = Url::parse(&format!("http://{host}")).map_err(|err| DeviceHostError::Invalid {
            host: host.to_string(),
            reason: err.to_string(),
        })?;
        if base.host_str().is_none() {
            return Err(DeviceHostError::Invalid {
                host: host.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(Self(host.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `http://{host}/control`, without a query.
    pub fn control_endpoint(&self) -> Result<Url, DispatchError> {
        Url::parse(&format!("http://{}{CONTROL_PATH}", self.0))
            .map_err(|err| DispatchError::InvalidEndpoint(format!("{}: {err}", self.0)))
    }

    /// `http://{host}/control?key={value}`
    pub fn control_url(&self, key: &KeyValue) -> Result<Url, DispatchError> {
        let mut url = self.control_endpoint()?;
        url.query_pairs_mut().append_pair("key", key.as_str());
        Ok(url)
    }
}

impl Default for DeviceHost {
    fn default() -> Self {
        Self(DEFAULT_DEVICE_HOST.to_string())
    }
}

impl TryFrom<String> for DeviceHost {
    type Error = DeviceHostError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DeviceHost> for String {
    fn from(value: DeviceHost) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchId(pub Uuid);

impl DispatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    #[default]
    Idle,
    Selected,
    Pending,
    Succeeded,
    HttpError,
    NetworkError,
}

impl DispatchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DispatchPhase::Succeeded | DispatchPhase::HttpError | DispatchPhase::NetworkError
        )
    }

    pub fn is_error(self) -> bool {
        matches!(self, DispatchPhase::HttpError | DispatchPhase::NetworkError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_rejects_blank_and_inner_whitespace() {
        assert_eq!(KeyValue::parse(""), Err(KeyValueError::Empty));
        assert_eq!(KeyValue::parse("   "), Err(KeyValueError::Empty));
        assert!(matches!(
            KeyValue::parse("1 2"),
            Err(KeyValueError::Whitespace(_))
        ));
        assert_eq!(KeyValue::parse(" 7 ").expect("trimmed").as_str(), "7");
    }

    #[test]
    fn default_keypad_is_a_three_by_three_grid_of_digits() {
        let keys = default_keypad();
        assert_eq!(keys.len(), 9);
        let captions: Vec<&str> = keys.iter().map(Key::caption).collect();
        assert_eq!(captions, ["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
        assert_eq!(keys[8].label, "All off");
    }

    #[test]
    fn control_url_carries_key_as_query_parameter() {
        let host = DeviceHost::default();
        let url = host
            .control_url(&KeyValue::parse("5").expect("key"))
            .expect("url");
        assert_eq!(url.as_str(), "http://192.168.100.14/control?key=5");
    }

    #[test]
    fn control_endpoint_has_no_query() {
        let host = DeviceHost::parse("pico.local").expect("host");
        let url = host.control_endpoint().expect("endpoint");
        assert_eq!(url.as_str(), "http://pico.local/control");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn control_url_keeps_explicit_port() {
        let host = DeviceHost::parse("127.0.0.1:8080").expect("host");
        let url = host
            .control_url(&KeyValue::parse("9").expect("key"))
            .expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/control?key=9");
    }

    #[test]
    fn device_host_must_be_bare() {
        assert_eq!(DeviceHost::parse(""), Err(DeviceHostError::Empty));
        assert!(matches!(
            DeviceHost::parse("http://192.168.1.2"),
            Err(DeviceHostError::NotBare(_))
        ));
        assert!(matches!(
            DeviceHost::parse("192.168.1.2/control"),
            Err(DeviceHostError::NotBare(_))
        ));
        assert!(DeviceHost::parse("pico.local").is_ok());
    }

    #[test]
    fn key_deserializes_without_value() {
        let key: Key = serde_json::from_str(r#"{"label":"spare"}"#).expect("key");
        assert_eq!(key.value, None);
        assert_eq!(key.caption(), "?");
    }

    #[test]
    fn terminal_phases() {
        assert!(!DispatchPhase::Pending.is_terminal());
        assert!(DispatchPhase::HttpError.is_terminal());
        assert!(DispatchPhase::NetworkError.is_error());
        assert!(!DispatchPhase::Succeeded.is_error());
    }
}
