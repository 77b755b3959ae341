//! Logging macros for ergonomic log message formatting.
//!
//! These macros check the logger's level before the message is formatted, so
//! a disabled call costs one level comparison and no allocation.
//!
//! # Examples
//!
//! ```
//! use rust_log_hierarchy::prelude::*;
//! use rust_log_hierarchy::info;
//!
//! let hierarchy = Hierarchy::new(Level::INFO);
//! let logger = hierarchy.get_logger("server");
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message at `level` with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_log_hierarchy::prelude::*;
/// # let logger = Hierarchy::default().get_logger("x");
/// use rust_log_hierarchy::log;
/// log!(logger, Level::INFO, "Simple message");
/// log!(logger, Level::ERROR, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled_for(level) {
            logger.forced_log($crate::LoggingEvent::new(
                logger.name(),
                level,
                format!($($arg)+),
            ));
        }
    }};
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::TRACE, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_hierarchy::prelude::*;
/// # let logger = Hierarchy::default().get_logger("x");
/// use rust_log_hierarchy::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::DEBUG, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::INFO, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::WARN, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_hierarchy::prelude::*;
/// # let logger = Hierarchy::default().get_logger("x");
/// use rust_log_hierarchy::error;
/// let err = "connection refused";
/// error!(logger, "Failed to connect: {}", err);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::ERROR, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::FATAL, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::appender::{Appender, AppenderSkeleton};
    use crate::core::event::LoggingEvent;
    use crate::core::hierarchy::Hierarchy;
    use crate::core::level::Level;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Lines {
        skeleton: AppenderSkeleton,
        lines: Mutex<Vec<String>>,
    }

    impl Appender for Lines {
        fn skeleton(&self) -> &AppenderSkeleton {
            &self.skeleton
        }

        fn append(&self, event: &LoggingEvent) {
            self.lines
                .lock()
                .push(format!("{} {}", event.level, event.message));
        }

        fn close(&self) {
            self.skeleton.mark_closed();
        }

        fn requires_layout(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_macros_format_and_guard() {
        let hierarchy = Hierarchy::new(Level::INFO);
        let sink = Arc::new(Lines {
            skeleton: AppenderSkeleton::new("lines"),
            lines: Mutex::new(Vec::new()),
        });
        let logger = hierarchy.get_logger("m");
        logger.add_appender(sink.clone());

        let formatted = AtomicUsize::new(0);
        let costly = || {
            formatted.fetch_add(1, Ordering::SeqCst);
            "value"
        };

        debug!(logger, "skipped {}", costly());
        info!(logger, "port {}", 8080);
        warn!(logger, "{}", costly());
        error!(logger, "code {}", 500);
        fatal!(logger, "bye");
        trace!(logger, "skipped too");

        assert_eq!(formatted.load(Ordering::SeqCst), 1);
        assert_eq!(
            *sink.lines.lock(),
            vec!["INFO port 8080", "WARN value", "ERROR code 500", "FATAL bye"]
        );
    }
}
