//! User-visible notifications.
//!
//! The workflow only decides *which* message to show; rendering and
//! translation belong to the notifier implementation.

use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Severity of a notification.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotificationKind {
    Success,
    Danger,
}

/// Translation key of a notification message.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MessageKey {
    EntrySaved,
    EntryUpdated,
    EntryPublished,
    EntryUnpublished,
    OnDeleteUnpublishedChanges,
    MissingRequiredField,
    OnFailToLoadEntries,
    OnFailToLoadEntry,
    OnFailToPersist,
    OnFailToUpdateStatus,
    OnFailToPublishEntry,
    OnFailToUnpublishEntry,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntrySaved => "ui.toast.entrySaved",
            Self::EntryUpdated => "ui.toast.entryUpdated",
            Self::EntryPublished => "ui.toast.entryPublished",
            Self::EntryUnpublished => "ui.toast.entryUnpublished",
            Self::OnDeleteUnpublishedChanges => "ui.toast.onDeleteUnpublishedChanges",
            Self::MissingRequiredField => "ui.toast.missingRequiredField",
            Self::OnFailToLoadEntries => "ui.toast.onFailToLoadEntries",
            Self::OnFailToLoadEntry => "ui.toast.onFailToLoadEntry",
            Self::OnFailToPersist => "ui.toast.onFailToPersist",
            Self::OnFailToUpdateStatus => "ui.toast.onFailToUpdateStatus",
            Self::OnFailToPublishEntry => "ui.toast.onFailToPublishEntry",
            Self::OnFailToUnpublishEntry => "ui.toast.onFailToUnpublishEntry",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Notification {
    pub key: MessageKey,
    pub kind: NotificationKind,
    /// Error text attached to danger notifications.
    pub details: Option<String>,
    pub dismiss_after: Duration,
}

/// How long notifications stay on screen.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DismissTimes {
    pub success: Duration,
    pub danger: Duration,
}

impl Default for DismissTimes {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(4000),
            danger: Duration::from_millis(8000),
        }
    }
}

impl DismissTimes {
    pub fn success(&self, key: MessageKey) -> Notification {
        Notification {
            key,
            kind: NotificationKind::Success,
            details: None,
            dismiss_after: self.success,
        }
    }

    pub fn danger(&self, key: MessageKey, details: Option<String>) -> Notification {
        Notification {
            key,
            kind: NotificationKind::Danger,
            details,
            dismiss_after: self.danger,
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => info!(key = %notification.key, "notification"),
            NotificationKind::Danger => warn!(
                key = %notification.key,
                details = notification.details.as_deref().unwrap_or(""),
                "notification"
            ),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    pub fn keys(&self) -> Vec<MessageKey> {
        self.entries.lock().iter().map(|n| n.key).collect()
    }

    pub fn contains(&self, key: MessageKey) -> bool {
        self.entries.lock().iter().any(|n| n.key == key)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.lock().push(notification);
    }
}
