//! Bridge between the UI thread and the tokio runtime that runs dispatches.

pub mod runtime;
pub mod sink;
