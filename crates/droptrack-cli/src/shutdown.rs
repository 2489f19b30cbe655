use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Shutdown flag shared between the Ctrl+C handler and the worker loop.
#[derive(Default)]
pub struct ShutdownSignal {
    triggered: Mutex<bool>,
    condvar: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let mut triggered = self.triggered.lock().unwrap_or_else(|e| e.into_inner());
        *triggered = true;
        self.condvar.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        *self.triggered.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep up to `timeout`; returns `true` if shutdown was triggered.
    pub fn wait(&self, timeout: Duration) -> bool {
        let triggered = self.triggered.lock().unwrap_or_else(|e| e.into_inner());
        let (triggered, _) = self
            .condvar
            .wait_timeout_while(triggered, timeout, |t| !*t)
            .unwrap_or_else(|e| e.into_inner());
        *triggered
    }
}
