use std::sync::{PoisonError, RwLock};

use shared::status::StatusUpdate;
use tokio::sync::broadcast;

/// Receives every status transition. Writes are last-write-wins.
pub trait StatusSink: Send + Sync {
    fn publish(&self, update: StatusUpdate);
}

/// In-memory status label: keeps only the latest update and fans each write
/// out to subscribers.
pub struct StatusLabel {
    current: RwLock<StatusUpdate>,
    updates: broadcast::Sender<StatusUpdate>,
}

impl StatusLabel {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(256);
        Self {
            current: RwLock::new(StatusUpdate::idle()),
            updates,
        }
    }

    pub fn text(&self) -> String {
        self.snapshot().text
    }

    pub fn snapshot(&self) -> StatusUpdate {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.updates.subscribe()
    }
}

impl Default for StatusLabel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for StatusLabel {
    fn publish(&self, update: StatusUpdate) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // Sent under the lock so subscribers see writes in label order.
        let _ = self.updates.send(update.clone());
        *current = update;
    }
}

#[cfg(test)]
mod tests {
    use shared::{
        domain::{DispatchId, DispatchPhase, KeyValue},
        error::DispatchError,
    };

    use super::*;

    #[test]
    fn starts_idle() {
        let label = StatusLabel::new();
        assert_eq!(label.snapshot().phase, DispatchPhase::Idle);
        assert_eq!(label.text(), shared::status::IDLE_TEXT);
    }

    #[test]
    fn keeps_only_the_latest_write() {
        let label = StatusLabel::new();
        let mut rx = label.subscribe();
        let id = DispatchId::new();
        let key = KeyValue::parse("2").expect("key");

        label.publish(StatusUpdate::selected(id, &key));
        label.publish(StatusUpdate::failed(
            id,
            &DispatchError::Transport("host unreachable".into()),
        ));

        assert_eq!(label.text(), "Network error: host unreachable");
        assert_eq!(rx.try_recv().expect("first").phase, DispatchPhase::Selected);
        assert_eq!(
            rx.try_recv().expect("second").phase,
            DispatchPhase::NetworkError
        );
    }
}
