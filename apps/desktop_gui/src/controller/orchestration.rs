//! Key activation from UI clicks to the dispatcher.

use client_core::{KeyDispatcher, PanelSettings};
use shared::domain::{DeviceHost, Key};

use crate::backend_bridge::sink::ChannelStatusSink;

pub type PanelDispatcher = KeyDispatcher<ChannelStatusSink>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Dispatched,
    NoValue,
    BackendUnavailable,
}

/// The request task is detached; its outcome arrives as status events.
pub fn activate_key(dispatcher: Option<&PanelDispatcher>, key: &Key) -> Activation {
    let Some(dispatcher) = dispatcher else {
        tracing::error!(label = %key.label, "key activated without a backend runtime");
        return Activation::BackendUnavailable;
    };

    match dispatcher.activate(key) {
        Some(_detached) => Activation::Dispatched,
        None => Activation::NoValue,
    }
}

/// Host that clicks are sent to; the settings value only while no backend
/// is running.
pub fn target_host<'a>(
    dispatcher: Option<&'a PanelDispatcher>,
    settings: &'a PanelSettings,
) -> &'a DeviceHost {
    dispatcher.map_or(&settings.device_host, |dispatcher| dispatcher.device_host())
}
