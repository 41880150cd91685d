//! Controller layer: UI events and key activation.

pub mod events;
pub mod orchestration;
