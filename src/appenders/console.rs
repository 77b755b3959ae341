//! Console appender implementation

use super::writer::WriterAppender;
use crate::core::appender::{Appender, AppenderSkeleton};
use crate::core::event::LoggingEvent;
use crate::core::layout::{Layout, TextLayout};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

/// Writes formatted events to standard output or standard error.
///
/// # Example
///
/// ```
/// use rust_log_hierarchy::appenders::{ConsoleAppender, ConsoleTarget};
/// use rust_log_hierarchy::{Hierarchy, Level, SimpleLayout};
/// use std::sync::Arc;
///
/// let hierarchy = Hierarchy::new(Level::INFO);
/// let console = ConsoleAppender::with_layout(Arc::new(SimpleLayout), ConsoleTarget::Stderr);
/// hierarchy.root_logger().add_appender(Arc::new(console));
/// hierarchy.get_logger("app").info("started");
/// ```
#[derive(Debug)]
pub struct ConsoleAppender {
    inner: WriterAppender,
    target: ConsoleTarget,
}

impl ConsoleAppender {
    /// Stdout with a colored [`TextLayout`].
    pub fn new() -> Self {
        Self::with_layout(
            Arc::new(TextLayout::new().with_colors(true)),
            ConsoleTarget::Stdout,
        )
    }

    pub fn with_layout(layout: Arc<dyn Layout>, target: ConsoleTarget) -> Self {
        let inner = WriterAppender::new("console");
        inner.set_layout(layout);
        match target {
            ConsoleTarget::Stdout => inner.set_writer(std::io::stdout()),
            ConsoleTarget::Stderr => inner.set_writer(std::io::stderr()),
        }
        Self { inner, target }
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    /// Underlying writer appender, for encoding and flush settings.
    pub fn writer(&self) -> &WriterAppender {
        &self.inner
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        self.inner.skeleton()
    }

    fn append(&self, event: &LoggingEvent) {
        self.inner.append(event);
    }

    fn close(&self) {
        self.inner.close();
    }

    fn requires_layout(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let console = ConsoleAppender::new();
        assert_eq!(console.target(), ConsoleTarget::Stdout);
        assert_eq!(console.name(), "console");
        assert!(console.writer().has_writer());
        assert!(console.requires_layout());
    }

    #[test]
    fn test_close_is_final() {
        let console = ConsoleAppender::with_layout(
            Arc::new(crate::core::layout::SimpleLayout),
            ConsoleTarget::Stderr,
        );
        console.close();
        assert!(console.is_closed());
        assert!(!console.writer().has_writer());
    }
}
