//! Transient notification messages.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Toast severity, which also selects the icon and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    /// Successful operation.
    #[default]
    Success,
    /// Failure the user should know about.
    Error,
    /// Non-critical issue.
    Warning,
    /// Neutral information.
    Info,
}

impl ToastSeverity {
    /// Lowercase name, as used for styling classes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Single-character icon shown next to the message.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Error => "✕",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }
}

impl fmt::Display for ToastSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toast identifier.
///
/// Derived from the creation time in milliseconds plus a random suffix;
/// uniqueness within a queue is enforced by the toast store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(u64);

impl ToastId {
    /// Number of random suffixes available per millisecond.
    pub const SUFFIX_SPACE: u64 = 1000;

    /// Compose an ID from a millisecond timestamp and a random suffix.
    #[must_use]
    pub const fn from_parts(timestamp_millis: u64, suffix: u64) -> Self {
        Self(
            timestamp_millis
                .saturating_mul(Self::SUFFIX_SPACE)
                .saturating_add(suffix % Self::SUFFIX_SPACE),
        )
    }

    /// Create an ID from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastMessage {
    /// Unique ID.
    pub id: ToastId,
    /// Text shown to the user.
    pub message: String,
    /// Severity.
    #[serde(rename = "type")]
    pub severity: ToastSeverity,
    /// Time on screen in milliseconds; zero means it stays until dismissed.
    pub duration_ms: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ToastMessage {
    /// Whether the toast stays until dismissed.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.duration_ms == 0
    }

    /// Auto-dismiss delay, if any.
    #[must_use]
    pub const fn expires_after(&self) -> Option<Duration> {
        if self.is_persistent() {
            None
        } else {
            Some(Duration::from_millis(self.duration_ms))
        }
    }
}
