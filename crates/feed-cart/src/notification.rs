//! Single-slot user notification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// The one message shown to the user.
///
/// A new notification replaces the previous one whether or not it was read.
/// Closing keeps the message and only clears `open`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notification {
    pub open: bool,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    /// An open notification.
    pub fn show(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            open: true,
            message: message.into(),
            severity,
        }
    }

    /// The same notification, closed.
    pub fn closed(&self) -> Self {
        Self {
            open: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_keeps_message() {
        let n = Notification::show("Cart cleared", Severity::Info).closed();
        assert!(!n.open);
        assert_eq!(n.message, "Cart cleared");
    }

    #[test]
    fn test_severity_wire_names() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        assert_eq!(Severity::Success.to_string(), "success");
    }
}
