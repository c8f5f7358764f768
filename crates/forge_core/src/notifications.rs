use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a toast shown next to the launch panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

/// A non-blocking message for the user. Never interrupts the launch flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub dismissed: bool,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            message: message.into(),
            dismissed: false,
            timestamp: Utc::now(),
        }
    }
}

/// Newest-first toast queue with a fixed capacity.
#[derive(Debug)]
pub struct NotificationCenter {
    items: Vec<Notification>,
    capacity: usize,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_capacity(50)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, notification: Notification) {
        tracing::debug!(kind = ?notification.kind, "{}", notification.message);
        self.items.insert(0, notification);
        self.items.truncate(self.capacity);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::new(NotificationKind::Info, message));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::new(NotificationKind::Success, message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::new(NotificationKind::Error, message));
    }

    pub fn dismiss(&mut self, id: &str) {
        if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
            n.dismissed = true;
        }
    }

    /// Toasts still on screen, newest first.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(|n| !n.dismissed)
    }

    pub fn all(&self) -> &[Notification] {
        &self.items
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}
