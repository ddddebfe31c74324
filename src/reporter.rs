//! Leveled event reporting.
//!
//! The conversion pipeline never formats output for display. Every event it
//! wants surfaced goes through a [`Reporter`] together with a [`Level`], and the
//! host decides what to do with it (write to a log, color a terminal, feed a UI).

use std::sync::Mutex;

/// Severity of a reported event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// Progress, mode and count information.
    Info,
    /// An archive was created.
    Success,
    /// Skipped inputs, excluded files, fail-open inclusions.
    Warning,
    /// A job failed.
    Error,
}

/// Sink for events emitted by the collector, the classifier and the worker pool.
///
/// Implementations must be callable from every worker at once.
pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn success(&self, message: &str) {
        self.report(Level::Success, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::Warning, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Forwards events to the [`log`] facade.
///
/// `Success` has no `log` counterpart; it is emitted at info level under the
/// `tabane::success` target so a logger can style it separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: Level, message: &str) {
        match level {
            Level::Info => log::info!("{}", message),
            Level::Success => log::info!(target: "tabane::success", "{}", message),
            Level::Warning => log::warn!("{}", message),
            Level::Error => log::error!("{}", message),
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events recorded so far.
    pub fn events(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    /// Messages recorded at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(event_level, _)| *event_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        self.lock().push((level, message.to_string()));
    }
}
