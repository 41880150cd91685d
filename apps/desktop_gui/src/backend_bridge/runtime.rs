//! Runtime hosting device requests for the lifetime of the window.

use tokio::runtime::{Builder, Runtime};

const BACKEND_WORKER_THREADS: usize = 2;

pub fn build() -> Result<Runtime, String> {
    Builder::new_multi_thread()
        .worker_threads(BACKEND_WORKER_THREADS)
        .thread_name("keypad-backend")
        .enable_all()
        .build()
        .map_err(|err| format!("backend worker startup failure: failed to build runtime: {err}"))
}
