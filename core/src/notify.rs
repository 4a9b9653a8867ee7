//! Transient user notifications.
//!
//! The synchronization component never returns errors to its caller; every
//! outcome worth telling the user about goes through an injected `Notifier`.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Sink for transient, non-blocking notifications.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn warn(&self, message: &str) {
        (**self).warn(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }

    fn success(&self, message: &str) {
        (**self).success(message)
    }
}

/// Sends every notification to both notifiers, left first.
impl<A: Notifier, B: Notifier> Notifier for (A, B) {
    fn warn(&self, message: &str) {
        self.0.warn(message);
        self.1.warn(message);
    }

    fn error(&self, message: &str) {
        self.0.error(message);
        self.1.error(message);
    }

    fn success(&self, message: &str) {
        self.0.success(message);
        self.1.success(message);
    }
}

/// Writes notifications to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        warn!(target: "todo::notify", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "todo::notify", "{message}");
    }

    fn success(&self, message: &str) {
        info!(target: "todo::notify", "{message}");
    }
}

/// Queues notifications until the presentation layer drains them.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<VecDeque<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().drain(..).collect()
    }

    /// Copy of the queue without consuming it.
    pub fn entries(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, level: NotificationLevel, message: &str) {
        self.lock().push_back(Notification {
            level,
            message: message.to_string(),
        });
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for NotificationLog {
    fn warn(&self, message: &str) {
        self.push(NotificationLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(NotificationLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.push(NotificationLevel::Success, message);
    }
}
