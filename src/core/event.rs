//! Logging event structure

use super::level::Level;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// An immutable record of one log call.
///
/// Nothing in the dispatch pipeline mutates an event once built; appenders
/// receive it by shared reference.
#[derive(Debug, Clone, Serialize)]
pub struct LoggingEvent {
    pub level: Level,
    pub logger_name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throwable: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
    pub thread_id: String,
    pub thread_name: Option<String>,
}

impl LoggingEvent {
    pub fn new(logger_name: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            logger_name: logger_name.into(),
            message: message.into(),
            throwable: None,
            timestamp: Utc::now(),
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
        }
    }

    /// Attach a pre-rendered throwable representation, one entry per line.
    #[must_use]
    pub fn with_throwable(mut self, lines: Vec<String>) -> Self {
        self.throwable = Some(lines);
        self
    }

    /// Render `error` and its `source()` chain as the throwable representation.
    #[must_use]
    pub fn with_error(self, error: &dyn std::error::Error) -> Self {
        let mut lines = vec![error.to_string()];
        let mut source = error.source();
        while let Some(cause) = source {
            lines.push(format!("Caused by: {}", cause));
            source = cause.source();
        }
        self.with_throwable(lines)
    }

    pub fn throwable_str_rep(&self) -> Option<&[String]> {
        self.throwable.as_deref()
    }

    /// Thread name when set, otherwise its id.
    pub fn thread_label(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }
}
