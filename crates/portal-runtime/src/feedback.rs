#![forbid(unsafe_code)]

//! User feedback: a blocking busy indicator and transient notifications.
//!
//! Nothing here renders. The shell reads [`Feedback::is_busy`] to show a
//! modal spinner and drains [`Feedback::drain`] to show toasts.

use std::collections::VecDeque;

/// Modal "sending" indicator. The user cannot dismiss it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyIndicator {
    open: bool,
}

impl BusyIndicator {
    /// The indicator ignores user close requests.
    pub const DISABLE_CLOSE: bool = true;

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// A user attempt to dismiss the indicator. Always refused.
    #[must_use]
    pub fn request_close(&mut self) -> bool {
        !Self::DISABLE_CLOSE
    }
}

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

/// Semantic kind of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Where the shell should place a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPosition {
    #[default]
    TopCenter,
    TopLeft,
    TopRight,
    BottomCenter,
}

/// A toast ready for display. Text is already translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub action_label: String,
    pub position: NotificationPosition,
}

/// Busy indicator plus the pending notification queue.
#[derive(Debug, Default)]
pub struct Feedback {
    busy: BusyIndicator,
    queue: VecDeque<Notification>,
    next_id: u64,
}

impl Feedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_busy(&mut self) {
        tracing::trace!("busy indicator opened");
        self.busy.open();
    }

    pub fn close_busy(&mut self) {
        tracing::trace!("busy indicator closed");
        self.busy.close();
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_open()
    }

    #[must_use]
    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    /// Queue a top-center notification.
    pub fn notify(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        action_label: impl Into<String>,
    ) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        let notification = Notification {
            id,
            kind,
            title: title.into(),
            action_label: action_label.into(),
            position: NotificationPosition::TopCenter,
        };
        tracing::debug!(id = id.0, kind = ?kind, title = %notification.title, "notification queued");
        self.queue.push_back(notification);
        id
    }

    /// Most recently queued notification still pending.
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    /// Pending notifications, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &VecDeque<Notification> {
        &self.queue
    }

    /// Take every pending notification.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    /// Remove one notification. Returns whether it was pending.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|notification| notification.id != id);
        self.queue.len() != before
    }
}
