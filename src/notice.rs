//! Transient user notifications ("toasts").
//!
//! The board reports what the user should see as [`Notice`] values on an
//! unbounded channel; rendering them is the host's business. Every notice is
//! also logged.

use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }
}

/// Sending half of the notice stream. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// A notifier whose notices are only logged.
    pub fn silent() -> Self {
        Self::new().0
    }

    pub fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => error!(text = %notice.message, "Notice"),
            NoticeLevel::Success | NoticeLevel::Info => info!(text = %notice.message, "Notice"),
        }
        if self.sender.send(notice).is_err() {
            debug!("Notice dropped, nobody is listening");
        }
    }
}
