use chrono::Local;
use client_core::PanelSettings;
use crossbeam_channel::Receiver;
use eframe::egui;
use shared::{domain::Key, status::StatusUpdate};
use tokio::runtime::Runtime;

use crate::controller::{
    events::{status_tone, StatusTone, UiEvent},
    orchestration::{activate_key, target_host, Activation, PanelDispatcher},
};

const KEY_BUTTON_SIZE: egui::Vec2 = egui::vec2(88.0, 64.0);

#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Settings problem found before the window opened; defaults are in use.
    pub settings_warning: Option<String>,
}

pub struct KeypadApp {
    settings: PanelSettings,
    dispatcher: Option<PanelDispatcher>,
    ui_rx: Receiver<UiEvent>,
    status: StatusUpdate,
    backend_error: Option<String>,
    settings_warning: Option<String>,
    // Dropped last so in-flight requests keep a live runtime.
    _runtime: Option<Runtime>,
}

impl KeypadApp {
    pub fn new(
        settings: PanelSettings,
        dispatcher: Option<PanelDispatcher>,
        runtime: Option<Runtime>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            settings,
            dispatcher,
            ui_rx,
            status: StatusUpdate::idle(),
            backend_error: None,
            settings_warning: startup.settings_warning,
            _runtime: runtime,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Status(update) => self.status = update,
                UiEvent::BackendUnavailable(reason) => {
                    tracing::error!("{reason}");
                    self.backend_error = Some(reason);
                }
            }
        }
    }

    fn on_key_clicked(&mut self, key: &Key) {
        if activate_key(self.dispatcher.as_ref(), key) == Activation::BackendUnavailable
            && self.backend_error.is_none()
        {
            self.backend_error = Some("Backend runtime is not running; restart the panel.".into());
        }
    }

    fn show_keypad(&mut self, ui: &mut egui::Ui) {
        let enabled = self.dispatcher.is_some();
        let mut clicked: Option<Key> = None;

        egui::Grid::new("keypad_grid")
            .spacing(egui::vec2(10.0, 10.0))
            .show(ui, |ui| {
                for row in self.settings.rows() {
                    for key in row {
                        let button = egui::Button::new(
                            egui::RichText::new(key.caption()).strong().size(26.0),
                        )
                        .min_size(KEY_BUTTON_SIZE);
                        let response = ui.add_enabled(enabled, button);
                        let response = if key.label.is_empty() {
                            response
                        } else {
                            response.on_hover_text(key.label.as_str())
                        };
                        if response.clicked() {
                            clicked = Some(key.clone());
                        }
                    }
                    ui.end_row();
                }
            });

        if let Some(key) = clicked {
            self.on_key_clicked(&key);
        }
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        if let Some(reason) = &self.backend_error {
            let color = ui.visuals().error_fg_color;
            ui.colored_label(color, reason.as_str());
            return;
        }

        let text = egui::RichText::new(&self.status.text).size(16.0);
        let text = match status_tone(self.status.phase) {
            StatusTone::Neutral => text,
            StatusTone::Busy => text.weak(),
            StatusTone::Success => text.color(egui::Color32::from_rgb(60, 170, 90)),
            StatusTone::Failure => text.color(ui.visuals().error_fg_color),
        };
        ui.horizontal_wrapped(|ui| {
            ui.label(text);
            ui.small(
                egui::RichText::new(
                    self.status
                        .at
                        .with_timezone(&Local)
                        .format("%H:%M:%S")
                        .to_string(),
                )
                .weak(),
            );
        });
    }
}

impl eframe::App for KeypadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Keypad Control Panel");
            let host = target_host(self.dispatcher.as_ref(), &self.settings);
            ui.weak(format!("Device: {host}"));
            if let Some(warning) = &self.settings_warning {
                let color = ui.visuals().warn_fg_color;
                ui.colored_label(color, warning.as_str());
            }
            ui.add_space(12.0);

            self.show_keypad(ui);

            ui.add_space(12.0);
            ui.separator();
            self.show_status(ui);
        });
    }
}
