use std::{collections::HashSet, fs, io, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use shared::domain::{default_keypad, DeviceHost, Key};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "keypad.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSettings {
    pub device_host: DeviceHost,
    /// `None` leaves the HTTP stack's own behaviour in place.
    pub request_timeout: Option<Duration>,
    pub columns: usize,
    pub keys: Vec<Key>,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            device_host: DeviceHost::default(),
            request_timeout: None,
            columns: 3,
            keys: default_keypad(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PanelFile {
    device_host: Option<String>,
    request_timeout_secs: Option<u64>,
    columns: Option<usize>,
    keys: Option<Vec<Key>>,
}

impl PanelSettings {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_toml(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn set_device_host(&mut self, raw: &str) -> Result<()> {
        self.device_host = DeviceHost::parse(raw)?;
        Ok(())
    }

    /// Keys split into display rows of `columns` keys.
    pub fn rows(&self) -> impl Iterator<Item = &[Key]> {
        self.keys.chunks(self.columns.max(1))
    }

    fn apply_toml(&mut self, raw: &str) -> Result<()> {
        let file: PanelFile = toml::from_str(raw)?;
        if let Some(host) = file.device_host {
            self.set_device_host(&host)?;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(columns) = file.columns {
            self.columns = columns;
        }
        if let Some(keys) = file.keys {
            self.keys = keys;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        for name in ["KEYPAD_DEVICE_HOST", "APP__DEVICE_HOST"] {
            if let Some(v) = env(name) {
                self.set_device_host(&v)
                    .with_context(|| format!("invalid {name}"))?;
            }
        }

        if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
            match v.parse::<u64>() {
                Ok(secs) => self.request_timeout = Some(Duration::from_secs(secs)),
                Err(err) => warn!("ignoring APP__REQUEST_TIMEOUT_SECS={v:?}: {err}"),
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            bail!("columns must be at least 1");
        }
        if self.keys.is_empty() {
            bail!("keypad must declare at least one key");
        }
        if self.request_timeout == Some(Duration::ZERO) {
            bail!("request_timeout_secs must be at least 1; leave it unset for no timeout");
        }

        let mut seen = HashSet::new();
        for value in self.keys.iter().filter_map(|key| key.value.as_ref()) {
            if !seen.insert(value.as_str()) {
                return Err(anyhow!("duplicate key value {value:?}"));
            }
        }
        Ok(())
    }
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicit `path` must exist and parse. Without one, `keypad.toml` in
/// the working directory is used when present and skipped with a warning
/// when it cannot be read.
pub fn load_settings(path: Option<&Path>) -> Result<PanelSettings> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

pub(crate) fn load_settings_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PanelSettings> {
    let mut settings = PanelSettings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
            settings
                .apply_toml(&raw)
                .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        }
        None => match fs::read_to_string(DEFAULT_CONFIG_FILE) {
            Ok(raw) => {
                let mut candidate = settings.clone();
                match candidate.apply_toml(&raw) {
                    Ok(()) => settings = candidate,
                    Err(err) => warn!("ignoring {DEFAULT_CONFIG_FILE}: {err:#}"),
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("ignoring {DEFAULT_CONFIG_FILE}: {err}"),
        },
    }

    settings.apply_env(env)?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
