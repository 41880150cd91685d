//! Status sink that hands dispatcher writes to the UI thread.

use client_core::StatusSink;
use crossbeam_channel::{Sender, TrySendError};
use eframe::egui;
use shared::status::StatusUpdate;

use crate::controller::events::UiEvent;

pub struct ChannelStatusSink {
    ui_tx: Sender<UiEvent>,
    repaint: egui::Context,
}

impl ChannelStatusSink {
    pub fn new(ui_tx: Sender<UiEvent>, repaint: egui::Context) -> Self {
        Self { ui_tx, repaint }
    }
}

/// Intermediate updates are dropped when the queue is full. A final update
/// waits for room, since nothing would replace it on the label.
impl StatusSink for ChannelStatusSink {
    fn publish(&self, update: StatusUpdate) {
        let terminal = update.phase.is_terminal();
        match self.ui_tx.try_send(UiEvent::Status(update)) {
            Ok(()) => self.repaint.request_repaint(),
            Err(TrySendError::Full(event)) if terminal => {
                self.repaint.request_repaint();
                match self.ui_tx.send(event) {
                    Ok(()) => self.repaint.request_repaint(),
                    Err(_) => tracing::debug!("ui event queue closed; window is shutting down"),
                }
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!("ui event queue is full; dropping status update");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("ui event queue closed; window is shutting down");
            }
        }
    }
}
