//! User-visible notifications
//!
//! The workflow reports every outcome through a [`Notifier`]: one transient
//! message per success or failure, plus each status transition so a front end
//! can toggle spinners and disable inputs.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{Error, FailureKind};

use super::session::WorkflowStatus;

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum Notification {
    Success { message: String },
    Error { kind: FailureKind, message: String },
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    pub fn error(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }

    /// Error notification for a caught failure
    pub fn from_error(err: &Error) -> Self {
        let kind = err.kind();
        let message = match err {
            Error::NoDocument => "Please upload a PDF first".to_string(),
            Error::Indexing(detail) => {
                format!("PDF stored but indexing failed, it cannot be queried yet: {}", detail)
            }
            other => other.to_string(),
        };
        Self::error(kind, message)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } | Self::Error { message, .. } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Failure kind for error notifications
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Error { kind, .. } => Some(*kind),
            Self::Success { .. } => None,
        }
    }
}

/// Sink for workflow notifications
pub trait Notifier: Send + Sync {
    /// Show a transient notification
    fn notify(&self, notification: Notification);

    /// Observe a status transition
    fn status_changed(&self, _from: WorkflowStatus, _to: WorkflowStatus) {}
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::Success { message } => tracing::info!("{}", message),
            Notification::Error { kind, message } => {
                tracing::warn!(kind = kind.label(), "{}", message)
            }
        }
    }

    fn status_changed(&self, from: WorkflowStatus, to: WorkflowStatus) {
        tracing::debug!("Status {} -> {}", from, to);
    }
}

/// Event forwarded by [`ChannelNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    Notification(Notification),
    Status {
        from: WorkflowStatus,
        to: WorkflowStatus,
    },
}

/// Notifier that forwards events to an unbounded channel
///
/// Sends never block; events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.sender.send(WorkflowEvent::Notification(notification));
    }

    fn status_changed(&self, from: WorkflowStatus, to: WorkflowStatus) {
        let _ = self.sender.send(WorkflowEvent::Status { from, to });
    }
}
