//! Timestamp rendering for layouts

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diagnostics;

const ISO8601_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

static INVALID_PATTERN_REPORTED: AtomicBool = AtomicBool::new(false);

/// How a layout renders [`LoggingEvent::timestamp`](super::LoggingEvent).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Milliseconds since the epoch: `1736332245123`
    UnixMillis,

    /// Any strftime-compatible pattern. A pattern chrono cannot render
    /// falls back to [`TimestampFormat::Iso8601`].
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format(ISO8601_PATTERN).to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => {
                let mut rendered = String::new();
                if write!(rendered, "{}", datetime.format(pattern)).is_ok() {
                    return rendered;
                }
                if !INVALID_PATTERN_REPORTED.swap(true, Ordering::Relaxed) {
                    diagnostics::warn(format!(
                        "invalid timestamp pattern \"{pattern}\", falling back to ISO-8601"
                    ));
                }
                datetime.format(ISO8601_PATTERN).to_string()
            }
        }
    }

    /// Whether chrono can render every specifier in `pattern`.
    #[must_use]
    pub fn is_valid_pattern(pattern: &str) -> bool {
        !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
    }

    /// Whether the rendered value is a bare integer (JSON emits it unquoted).
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::UnixMillis)
    }
}
