//! Notification boundary contract.
//!
//! The core never renders toasts or banners; it only emits
//! (severity, message) pairs through a caller-supplied [`Notifier`]. The
//! fixed operator-facing messages live in [`messages`]; validation failures
//! use [`ValidationError::user_message`] instead.
//!
//! [`ValidationError::user_message`]: crate::intake::ValidationError::user_message

use serde::{Deserialize, Serialize};

/// Severity of an emitted notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Progress information, e.g. an export starting.
    Info,
    /// A completed operation.
    Success,
    /// A recoverable failure the operator should act on.
    Error,
}

impl Severity {
    /// Returns the stable machine token for this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

/// Receives (severity, message) pairs from the core.
///
/// Implementations decide presentation (toast, log line, status bar); the
/// core only decides content.
pub trait Notifier {
    /// Delivers one notification.
    fn notify(&mut self, severity: Severity, message: &str);
}

/// A notifier that discards everything.
///
/// Useful for callers without a notification surface; the core still
/// mirrors every emission on the `tracing` output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, _severity: Severity, _message: &str) {}
}

/// Fixed operator-facing messages emitted by the controller.
pub mod messages {
    /// Emitted after every committed record, in both submit modes.
    pub const RECORD_SAVED: &str = "Service recorded successfully";
    /// Emitted when a report export starts.
    pub const EXPORT_STARTED: &str = "Generating report image";
    /// Emitted when a report export completes.
    pub const EXPORT_DONE: &str = "Report exported successfully";
    /// Emitted when the export collaborator fails.
    pub const EXPORT_FAILED: &str = "Failed to export the report";
    /// Emitted when exporting with an empty session ledger.
    pub const EMPTY_SESSION: &str = "Record at least one service event first";
    /// Emitted when the session ledger refuses further records.
    pub const SESSION_FULL: &str = "Session record limit reached";
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn severity_tokens_are_stable() {
        assert_eq!(Severity::Info.as_str(), "INFO");
        assert_eq!(Severity::Success.as_str(), "SUCCESS");
        assert_eq!(Severity::Error.as_str(), "ERROR");
    }

    #[test]
    fn null_notifier_accepts_anything() {
        let mut notifier = NullNotifier;
        notifier.notify(Severity::Error, "ignored");
    }
}
