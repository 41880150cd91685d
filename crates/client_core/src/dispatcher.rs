use std::sync::Arc;

use shared::{
    domain::{DeviceHost, DispatchId, DispatchPhase, Key, KeyValue},
    status::StatusUpdate,
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{error, info, warn};

use crate::{status::StatusSink, DeviceTransport};

/// Turns key activations into device requests.
///
/// Every activation writes `Key {v} selected.` before returning, then runs
/// its request on the runtime. Activations are never cancelled or queued:
/// overlapping requests race and the last one to finish owns the label.
pub struct KeyDispatcher<S: StatusSink + ?Sized> {
    transport: Arc<dyn DeviceTransport>,
    status: Arc<S>,
    runtime: Handle,
}

impl<S: StatusSink + ?Sized + 'static> KeyDispatcher<S> {
    pub fn new(transport: Arc<dyn DeviceTransport>, status: Arc<S>, runtime: Handle) -> Self {
        Self {
            transport,
            status,
            runtime,
        }
    }

    pub fn device_host(&self) -> &DeviceHost {
        self.transport.device_host()
    }

    /// Returns `None` when the key has no value; nothing is sent and the
    /// label is left as it was.
    pub fn activate(&self, key: &Key) -> Option<JoinHandle<DispatchPhase>> {
        let Some(value) = key.value.clone() else {
            warn!(label = %key.label, "activated key has no value; no request sent");
            return None;
        };
        Some(self.dispatch(value))
    }

    pub fn activate_value(&self, raw: &str) -> Option<JoinHandle<DispatchPhase>> {
        match KeyValue::parse(raw) {
            Ok(value) => Some(self.dispatch(value)),
            Err(err) => {
                warn!(raw, "ignoring key activation: {err}");
                None
            }
        }
    }

    fn dispatch(&self, value: KeyValue) -> JoinHandle<DispatchPhase> {
        let dispatch_id = DispatchId::new();
        info!(%dispatch_id, key = %value, "key pressed");
        self.status
            .publish(StatusUpdate::selected(dispatch_id, &value));

        let transport = Arc::clone(&self.transport);
        let status = Arc::clone(&self.status);
        self.runtime.spawn(async move {
            status.publish(StatusUpdate::sending(dispatch_id));

            let update = match transport.send_key(&value).await {
                Ok(response) => {
                    info!(%dispatch_id, key = %value, message = %response.message, "device responded");
                    StatusUpdate::responded(dispatch_id, &response.message)
                }
                Err(err) => {
                    error!(%dispatch_id, key = %value, "control request failed: {err}");
                    StatusUpdate::failed(dispatch_id, &err)
                }
            };

            let phase = update.phase;
            status.publish(update);
            phase
        })
    }
}
