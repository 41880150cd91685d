//! UI layer: keypad window.

pub mod app;

pub use app::{KeypadApp, StartupConfig};
