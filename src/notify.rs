//! Notification routing.
//!
//! Every status message goes to the transient toast layer; a copy is
//! queued for the notification tray only when the host window lacks input
//! focus at call time. There is no debouncing and no coalescing — the
//! queue is a plain list the user dismisses entry by entry.

use serde::{Deserialize, Serialize};

/// Toast auto-dismiss default, in milliseconds.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 4500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Info,
    Error,
}

/// A single user-visible message. `duration_ms == 0` means the toast does
/// not auto-dismiss; that sentinel is forwarded verbatim to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub text: String,
    pub severity: Severity,
    pub duration_ms: u64,
}

impl Notification {
    pub fn new(title: impl Into<String>, text: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            severity,
            duration_ms: DEFAULT_TOAST_DURATION_MS,
        }
    }

    /// A notification that stays on screen until dismissed.
    pub fn sticky(title: impl Into<String>, text: impl Into<String>, severity: Severity) -> Self {
        Self::new(title, text, severity).with_duration(0)
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// The transient toast widget, owned by the UI host.
pub trait ToastSink: Send {
    fn show(&mut self, notification: &Notification);
}

/// Routes notifications to the toast sink and, while the host window is
/// unfocused, additionally into the queued list. Owns no business logic.
pub struct NotificationRelay {
    sink: Box<dyn ToastSink>,
    queued: Vec<Notification>,
    focused: bool,
}

impl NotificationRelay {
    pub fn new(sink: Box<dyn ToastSink>) -> Self {
        Self {
            sink,
            queued: Vec::new(),
            // The window has focus when the app starts.
            focused: true,
        }
    }

    /// Routing decision is based solely on focus state at call time.
    pub fn relay(&mut self, notification: Notification) {
        self.sink.show(&notification);
        if !self.focused {
            tracing::debug!(
                "[Relay] Window unfocused, queueing '{}'",
                notification.title
            );
            self.queued.push(notification);
        }
    }

    pub fn success(&mut self, title: &str, text: &str) {
        self.relay(Notification::new(title, text, Severity::Success));
    }

    pub fn info(&mut self, title: &str, text: &str) {
        self.relay(Notification::new(title, text, Severity::Info));
    }

    pub fn warning(&mut self, title: &str, text: &str) {
        self.relay(Notification::new(title, text, Severity::Warning));
    }

    pub fn error(&mut self, title: &str, text: &str) {
        self.relay(Notification::new(title, text, Severity::Error));
    }

    /// Fed by the host on window focus changes.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn queued(&self) -> &[Notification] {
        &self.queued
    }

    /// Removes one queued entry by index, if present.
    pub fn dismiss(&mut self, index: usize) -> Option<Notification> {
        if index < self.queued.len() {
            Some(self.queued.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.queued.clear();
    }
}
