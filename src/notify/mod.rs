//! Toast notification system
//!
//! `Notifier` is the single surface every component uses to report
//! user-visible failures and status. It is created once by the application
//! root and cloned into each view; all clones feed the same queue.

pub mod queue;

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::NotificationConfig;

pub use queue::{Notification, NotificationQueue, QueueState, Timer};

/// A toast notification message
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    /// The message to display
    pub message: String,
    /// The severity level of the toast
    pub level: ToastLevel,
    /// When the toast was created
    pub timestamp: Instant,
}

/// Severity level for toast notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl Toast {
    pub fn new(message: String, level: ToastLevel) -> Self {
        Self {
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Success)
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What a renderer needs to draw the toast area
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastSnapshot {
    pub current: Option<Notification>,
    /// False while the current toast plays its exit transition
    pub visible: bool,
    pub pending: usize,
}

struct NotifierInner {
    queue: Mutex<NotificationQueue>,
    snapshots: watch::Sender<ToastSnapshot>,
}

/// Cloneable handle to the process-wide toast queue.
///
/// Timers run on the tokio runtime the handle is used from. Without a
/// runtime a toast is still queued and shown, but it stays on screen until
/// dismissed.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl Notifier {
    pub fn new(config: NotificationConfig) -> Self {
        let (snapshots, _) = watch::channel(ToastSnapshot::default());
        Self {
            inner: Arc::new(NotifierInner {
                queue: Mutex::new(NotificationQueue::new(config)),
                snapshots,
            }),
        }
    }

    pub fn enqueue(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => tracing::warn!(message = %toast.message, "error toast"),
            ToastLevel::Warning => tracing::warn!(message = %toast.message, "warning toast"),
            ToastLevel::Info | ToastLevel::Success => {
                tracing::info!(message = %toast.message, "toast")
            }
        }

        let timer = self.inner.queue.lock().enqueue(toast);
        self.publish();
        if let Some(timer) = timer {
            self.arm(timer);
        }
    }

    pub fn error(&self, message: impl Into<String>) {
        self.enqueue(Toast::error(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.enqueue(Toast::info(message));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.enqueue(Toast::success(message));
    }

    /// Close the visible toast early
    pub fn dismiss(&self) {
        let timer = self.inner.queue.lock().dismiss();
        self.publish();
        if let Some(timer) = timer {
            self.arm(timer);
        }
    }

    pub fn snapshot(&self) -> ToastSnapshot {
        let queue = self.inner.queue.lock();
        ToastSnapshot {
            current: queue.current().cloned(),
            visible: queue.is_visible(),
            pending: queue.pending(),
        }
    }

    /// Watch the toast area; a new snapshot is published on every transition
    pub fn subscribe(&self) -> watch::Receiver<ToastSnapshot> {
        self.inner.snapshots.subscribe()
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.inner.snapshots.send_replace(snapshot);
    }

    fn arm(&self, timer: Timer) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(?timer, "no runtime, toast timer not armed");
            return;
        };

        let weak: Weak<NotifierInner> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(timer.after()).await;
            if let Some(inner) = weak.upgrade() {
                Notifier { inner }.fire(timer);
            }
        });
    }

    fn fire(&self, timer: Timer) {
        let next = {
            let mut queue = self.inner.queue.lock();
            match timer {
                Timer::Display { seq, .. } => queue.display_elapsed(seq),
                Timer::Grace { seq, .. } => queue.grace_elapsed(seq),
            }
        };
        self.publish();
        if let Some(next) = next {
            self.arm(next);
        }
    }
}
