//! User-facing notification sink contract.

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Operation succeeded.
    Success,
    /// Neutral information.
    Info,
    /// Recoverable problem.
    Warning,
    /// Operation failed.
    Error,
}

impl Severity {
    /// Lowercase label used by console and log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Message text.
    pub message: Box<str>,
    /// Severity.
    pub severity: Severity,
    /// How long the message should stay visible, in milliseconds.
    pub duration_hint_ms: u64,
}

/// Fire-and-forget notification sink.
pub trait NotifierPort: Send + Sync {
    /// Deliver a notification. Failures are swallowed by the sink.
    fn notify(&self, notification: Notification);
}
