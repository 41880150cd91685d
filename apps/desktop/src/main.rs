use std::{fmt::Write as _, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, DeviceTransport, HttpDeviceClient, KeyDispatcher, PanelSettings, StatusLabel,
};
use shared::{
    domain::{DispatchPhase, KeyValue},
    status::StatusUpdate,
};
use tokio::{runtime::Handle, sync::broadcast};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "keypad", about = "Send keypad commands to the LED bar controller")]
struct Cli {
    /// Device address (`host` or `host:port`), overrides settings and env.
    #[arg(long)]
    device_host: Option<String>,
    /// Settings file; defaults to ./keypad.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the keypad layout.
    Keys,
    /// Activate keys in order without waiting between them.
    Press {
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Print the request URL for a key.
    Url { value: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(host) = &cli.device_host {
        settings
            .set_device_host(host)
            .context("invalid --device-host")?;
    }

    match cli.command {
        Command::Keys => {
            print!("{}", render_keypad(&settings));
            Ok(ExitCode::SUCCESS)
        }
        Command::Url { value } => {
            let key = KeyValue::parse(value)?;
            println!("{}", settings.device_host.control_url(&key)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Press { values } => {
            let last = press(&settings, &values).await?;
            println!("final: {}", last.text);
            if last.phase.is_error() {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn press(settings: &PanelSettings, values: &[String]) -> Result<StatusUpdate> {
    let transport: Arc<dyn DeviceTransport> = Arc::new(HttpDeviceClient::from_settings(settings)?);
    let label = Arc::new(StatusLabel::new());
    let printer = tokio::spawn(print_updates(label.subscribe()));
    let dispatcher = KeyDispatcher::new(transport, Arc::clone(&label), Handle::current());

    let handles: Vec<_> = values
        .iter()
        .filter_map(|value| dispatcher.activate_value(value))
        .collect();
    if handles.is_empty() {
        bail!("no valid key values given");
    }

    for result in futures::future::join_all(handles).await {
        result.context("dispatch task failed")?;
    }

    let last = label.snapshot();
    drop(dispatcher);
    drop(label);
    printer.await.context("status printer failed")?;
    Ok(last)
}

async fn print_updates(mut updates: broadcast::Receiver<StatusUpdate>) {
    loop {
        match updates.recv().await {
            Ok(update) => println!("{:<13} {}", phase_tag(update.phase), update.text),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "status printer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn phase_tag(phase: DispatchPhase) -> &'static str {
    match phase {
        DispatchPhase::Idle => "[idle]",
        DispatchPhase::Selected => "[selected]",
        DispatchPhase::Pending => "[pending]",
        DispatchPhase::Succeeded => "[ok]",
        DispatchPhase::HttpError => "[http-error]",
        DispatchPhase::NetworkError => "[net-error]",
    }
}

fn render_keypad(settings: &PanelSettings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "device: {}", settings.device_host);
    for row in settings.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|key| format!("[{}] {:<16}", key.caption(), key.label))
            .collect();
        let _ = writeln!(out, "{}", cells.join(" ").trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_default_keypad_in_three_rows() {
        let rendered = render_keypad(&PanelSettings::default());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "device: 192.168.100.14");
        assert!(lines[1].starts_with("[1] Left to right"));
        assert!(lines[3].ends_with("[9] All off"));
    }

    #[test]
    fn press_requires_at_least_one_value() {
        assert!(Cli::try_parse_from(["keypad", "press"]).is_err());
        let cli = Cli::try_parse_from(["keypad", "--device-host", "10.0.0.9", "press", "1", "2"])
            .expect("parse");
        assert_eq!(cli.device_host.as_deref(), Some("10.0.0.9"));
        match cli.command {
            Command::Press { values } => assert_eq!(values, ["1", "2"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn error_phases_have_distinct_tags() {
        assert_eq!(phase_tag(DispatchPhase::HttpError), "[http-error]");
        assert_eq!(phase_tag(DispatchPhase::NetworkError), "[net-error]");
    }
}
