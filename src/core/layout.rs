//! Layouts turn events into text
//!
//! Appenders treat a layout as an opaque formatter: `format` renders one
//! event, `header`/`footer` bracket the output stream, and
//! `ignores_throwable` tells the appender whether it must write the event's
//! throwable lines itself.

use super::diagnostics;
use super::event::LoggingEvent;
use super::timestamp::TimestampFormat;

/// Line separator written after every formatted event and throwable line.
pub const LINE_SEP: &str = "\n";

pub trait Layout: Send + Sync {
    fn format(&self, event: &LoggingEvent) -> String;

    fn header(&self) -> Option<String> {
        None
    }

    fn footer(&self) -> Option<String> {
        None
    }

    /// `true` when `format` does not render `event.throwable`.
    fn ignores_throwable(&self) -> bool {
        true
    }

    fn content_type(&self) -> &str {
        "text/plain"
    }
}

/// `LEVEL - message`
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleLayout;

impl SimpleLayout {
    pub fn new() -> Self {
        Self
    }
}

impl Layout for SimpleLayout {
    fn format(&self, event: &LoggingEvent) -> String {
        let mut out = String::with_capacity(event.message.len() + 12);
        out.push_str(event.level.name());
        out.push_str(" - ");
        out.push_str(&event.message);
        out.push_str(LINE_SEP);
        out
    }
}

/// Human-readable text: `[timestamp] [LEVEL] [thread] logger - message`
#[derive(Debug, Clone)]
pub struct TextLayout {
    timestamp_format: TimestampFormat,
    include_thread: bool,
    include_logger: bool,
    use_colors: bool,
    header: Option<String>,
    footer: Option<String>,
}

impl TextLayout {
    pub fn new() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            include_thread: true,
            include_logger: true,
            use_colors: false,
            header: None,
            footer: None,
        }
    }

    /// Set the timestamp format for this layout
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_log_hierarchy::{TextLayout, TimestampFormat};
    ///
    /// let layout = TextLayout::new().with_timestamp_format(TimestampFormat::Rfc3339);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Use a strftime pattern for the timestamp. A pattern chrono cannot
    /// render is reported on the diagnostics channel and the current format
    /// is kept.
    #[must_use]
    pub fn with_custom_timestamp(mut self, pattern: &str) -> Self {
        if TimestampFormat::is_valid_pattern(pattern) {
            self.timestamp_format = TimestampFormat::Custom(pattern.to_string());
        } else {
            diagnostics::warn(format!(
                "invalid timestamp pattern \"{pattern}\", keeping {:?}",
                self.timestamp_format
            ));
        }
        self
    }

    #[must_use]
    pub fn with_thread(mut self, include: bool) -> Self {
        self.include_thread = include;
        self
    }

    #[must_use]
    pub fn with_logger_name(mut self, include: bool) -> Self {
        self.include_logger = include;
        self
    }

    /// Color the level tag. Ignored without the `console` feature.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    #[cfg(feature = "console")]
    fn level_tag(&self, event: &LoggingEvent) -> String {
        use colored::Colorize;
        let tag = format!("{:5}", event.level);
        if self.use_colors {
            tag.color(event.level.color_code()).to_string()
        } else {
            tag
        }
    }

    #[cfg(not(feature = "console"))]
    fn level_tag(&self, event: &LoggingEvent) -> String {
        let _ = self.use_colors;
        format!("{:5}", event.level)
    }
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout for TextLayout {
    fn format(&self, event: &LoggingEvent) -> String {
        let mut out = format!(
            "[{}] [{}]",
            self.timestamp_format.format(&event.timestamp),
            self.level_tag(event)
        );
        if self.include_thread {
            out.push_str(" [");
            out.push_str(event.thread_label());
            out.push(']');
        }
        if self.include_logger {
            out.push(' ');
            out.push_str(&event.logger_name);
        }
        out.push_str(" - ");
        out.push_str(&event.message);
        out.push_str(LINE_SEP);
        out
    }

    fn header(&self) -> Option<String> {
        self.header.clone()
    }

    fn footer(&self) -> Option<String> {
        self.footer.clone()
    }
}

/// One JSON object per line, throwable included.
#[derive(Debug, Clone, Default)]
pub struct JsonLayout {
    timestamp_format: TimestampFormat,
}

impl JsonLayout {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn timestamp_value(&self, event: &LoggingEvent) -> serde_json::Value {
        if self.timestamp_format.is_numeric() {
            serde_json::Value::from(event.timestamp.timestamp_millis())
        } else {
            serde_json::Value::String(self.timestamp_format.format(&event.timestamp))
        }
    }
}

impl Layout for JsonLayout {
    fn format(&self, event: &LoggingEvent) -> String {
        let mut json_obj = serde_json::Map::new();
        json_obj.insert("timestamp".to_string(), self.timestamp_value(event));
        json_obj.insert(
            "level".to_string(),
            serde_json::Value::String(event.level.name().to_string()),
        );
        json_obj.insert(
            "logger".to_string(),
            serde_json::Value::String(event.logger_name.clone()),
        );
        json_obj.insert(
            "message".to_string(),
            serde_json::Value::String(event.message.clone()),
        );
        json_obj.insert(
            "thread".to_string(),
            serde_json::Value::String(event.thread_label().to_string()),
        );
        if let Some(lines) = event.throwable_str_rep() {
            json_obj.insert(
                "throwable".to_string(),
                serde_json::Value::Array(
                    lines
                        .iter()
                        .map(|l| serde_json::Value::String(l.clone()))
                        .collect(),
                ),
            );
        }

        let mut out =
            serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default();
        out.push_str(LINE_SEP);
        out
    }

    fn ignores_throwable(&self) -> bool {
        false
    }

    fn content_type(&self) -> &str {
        "application/json"
    }
}
