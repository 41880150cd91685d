use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::{runtime, sink::ChannelStatusSink};
use clap::Parser;
use client_core::{
    config::DEFAULT_CONFIG_FILE, load_settings, DeviceTransport, HttpDeviceClient, PanelSettings,
};
use controller::{events::UiEvent, orchestration::PanelDispatcher};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::{KeypadApp, StartupConfig};

const APP_TITLE: &str = "Keypad Control Panel";

#[derive(Parser, Debug)]
#[command(name = "keypad_gui", about = "Keypad window for the LED bar controller")]
struct Args {
    #[arg(long)]
    device_host: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Explicit path, else `./keypad.toml` (picked up by `load_settings`), else
/// `<config dir>/keypad/keypad.toml` when it exists.
fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    if Path::new(DEFAULT_CONFIG_FILE).exists() {
        return None;
    }
    let candidate = dirs::config_dir()?.join("keypad").join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Settings problems never stop the window from opening; they fall back to
/// defaults and show up as a warning line.
fn resolve_settings(args: &Args) -> (PanelSettings, Option<String>) {
    let path = resolve_config_path(args.config.clone());
    let mut settings = match load_settings(path.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("failed to load panel settings: {err:#}");
            return (
                PanelSettings::default(),
                Some(format!("Settings not loaded ({err:#}); using defaults.")),
            );
        }
    };

    let mut warning = None;
    if let Some(host) = &args.device_host {
        if let Err(err) = settings.set_device_host(host) {
            tracing::warn!("ignoring --device-host {host:?}: {err:#}");
            warning = Some(format!("Ignored --device-host: {err:#}"));
        }
    }
    (settings, warning)
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let (settings, settings_warning) = resolve_settings(&args);
    tracing::info!(device_host = %settings.device_host, keys = settings.keys.len(), "starting keypad window");

    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    let runtime = match runtime::build() {
        Ok(runtime) => Some(runtime),
        Err(reason) => {
            let _ = ui_tx.try_send(UiEvent::BackendUnavailable(reason));
            None
        }
    };
    let transport: Option<Arc<dyn DeviceTransport>> =
        match HttpDeviceClient::from_settings(&settings) {
            Ok(client) => Some(Arc::new(client)),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendUnavailable(format!(
                    "backend worker startup failure: {err:#}"
                )));
                None
            }
        };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([360.0, 440.0])
            .with_min_inner_size([320.0, 380.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| {
            let dispatcher = match (&runtime, transport) {
                (Some(runtime), Some(transport)) => {
                    let sink = Arc::new(ChannelStatusSink::new(ui_tx, cc.egui_ctx.clone()));
                    Some(PanelDispatcher::new(
                        transport,
                        sink,
                        runtime.handle().clone(),
                    ))
                }
                _ => None,
            };
            Ok(Box::new(KeypadApp::new(
                settings,
                dispatcher,
                runtime,
                ui_rx,
                StartupConfig { settings_warning },
            )))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_path_wins() {
        let explicit = PathBuf::from("/etc/keypad/panel.toml");
        assert_eq!(resolve_config_path(Some(explicit.clone())), Some(explicit));
    }

    #[test]
    fn invalid_device_host_flag_falls_back_with_warning() {
        let args = Args::try_parse_from(["keypad_gui", "--device-host", "http://pico/"])
            .expect("parse");
        let (settings, warning) = resolve_settings(&args);

        assert!(warning.expect("warning").starts_with("Ignored --device-host"));
        assert!(!settings.device_host.as_str().contains("http"));
    }
}
