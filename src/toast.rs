//! Toast Notification Queue
//!
//! Transient feedback messages stacked in arrival order. The queue only
//! tracks what is on screen; the controller decides when a toast starts its
//! exit transition and when it is dropped.

use serde::Serialize;

/// Severity of a feedback message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

impl Severity {
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Warning => "⚠",
            Severity::Error => "✕",
            Severity::Info => "ℹ",
        }
    }

    /// Background colour of the notification
    pub fn color(self) -> &'static str {
        match self {
            Severity::Success => "#28a745",
            Severity::Warning => "#ffc107",
            Severity::Error => "#dc3545",
            Severity::Info => "#17a2b8",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ToastId(u64);

/// Visible, or sliding out before removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToastPhase {
    Visible,
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub text: String,
    pub severity: Severity,
    pub phase: ToastPhase,
}

/// Notifications currently on screen, oldest first
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a visible notification and returns its id.
    pub fn show(&mut self, text: impl Into<String>, severity: Severity) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            text: text.into(),
            severity,
            phase: ToastPhase::Visible,
        });
        id
    }

    /// Starts the exit transition. Returns `false` for unknown ids.
    pub fn begin_exit(&mut self, id: ToastId) -> bool {
        match self.toasts.iter_mut().find(|t| t.id == id) {
            Some(toast) => {
                toast.phase = ToastPhase::Exiting;
                true
            }
            None => false,
        }
    }

    /// Drops the notification. Returns `false` for unknown ids.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}
