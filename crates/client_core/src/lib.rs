use std::error::Error as StdError;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{DeviceHost, KeyValue},
    error::DispatchError,
    protocol::{ControlQuery, ControlResponse},
};
use tracing::debug;

pub mod config;
mod dispatcher;
mod status;

pub use config::{load_settings, PanelSettings};
pub use dispatcher::KeyDispatcher;
pub use status::{StatusLabel, StatusSink};

/// Delivers one key value to the device and reports what came back.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    async fn send_key(&self, key: &KeyValue) -> Result<ControlResponse, DispatchError>;
    fn device_host(&self) -> &DeviceHost;
}

pub struct HttpDeviceClient {
    http: Client,
    host: DeviceHost,
}

impl HttpDeviceClient {
    pub fn new(host: DeviceHost) -> Self {
        Self {
            http: Client::new(),
            host,
        }
    }

    pub fn from_settings(settings: &PanelSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build HTTP client for device requests")?;
        Ok(Self {
            http,
            host: settings.device_host.clone(),
        })
    }
}

#[async_trait]
impl DeviceTransport for HttpDeviceClient {
    async fn send_key(&self, key: &KeyValue) -> Result<ControlResponse, DispatchError> {
        let url = self.host.control_endpoint()?;
        debug!(%url, key = %key, "sending control request");

        let response = self
            .http
            .get(url)
            .query(&ControlQuery { key: key.clone() })
            .send()
            .await
            .map_err(|err| DispatchError::Transport(error_chain(&err)))?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string());
            return Err(DispatchError::http(status.as_u16(), status_text));
        }

        response
            .json::<ControlResponse>()
            .await
            .map_err(|err| DispatchError::Decode(error_chain(&err)))
    }

    fn device_host(&self) -> &DeviceHost {
        &self.host
    }
}

/// reqwest keeps the useful part ("connection refused", the serde position)
/// in the source chain, not in the top-level message.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
