//! Diagnostic sink shared by readers and writers.

use std::{fmt, sync::Arc};
use tracing::warn;

/// Callback receiving a single diagnostic message.
pub type LogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Routes cursor diagnostics to a user callback, or to [`tracing`] when none
/// is installed.
#[derive(Clone, Default)]
pub struct Logger {
    callback: Option<LogFn>,
}

impl Logger {
    /// Creates a logger that forwards every message to `callback`.
    pub fn new(callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    /// Emits `message`.
    pub fn log(&self, message: &str) {
        match &self.callback {
            Some(callback) => callback(message),
            None => warn!("{message}"),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
