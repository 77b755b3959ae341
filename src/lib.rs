//! # Rust Log Hierarchy
//!
//! Hierarchical, named loggers with per-logger levels, additive appender
//! inheritance and a thread-safe dispatch pipeline.
//!
//! ## Features
//!
//! - **Dotted namespaces**: `"a.b.c"` inherits level and appenders from `"a.b"`
//!   and `"a"`, whatever order they are created in
//! - **Appenders**: writer, console, file and asynchronous appenders, each with
//!   its own threshold, filter chain and error handler
//! - **Thread Safe**: loggers may be created and used from any thread
//! - **No implicit setup**: a [`Hierarchy`] is configured programmatically or
//!   from a [`HierarchyConfig`]
//!
//! ```
//! use rust_log_hierarchy::prelude::*;
//! use std::sync::Arc;
//!
//! let hierarchy = Hierarchy::new(Level::INFO);
//! let console = ConsoleAppender::with_layout(Arc::new(SimpleLayout), ConsoleTarget::Stdout);
//! hierarchy.root_logger().add_appender(Arc::new(console));
//!
//! let db = hierarchy.get_logger("app.db");
//! db.info("connected");
//! db.debug("not shown: root is at INFO");
//! hierarchy.shutdown();
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{
        AsyncAppender, ConsoleAppender, ConsoleTarget, FileAppender, FlushPolicy, WriterAppender,
    };
    pub use crate::core::{
        Appender, AppenderRef, Filter, FilterDecision, Hierarchy, HierarchyConfig, JsonLayout,
        Layout, Level, Logger, LoggerError, LoggingEvent, Result, SimpleLayout, TextLayout,
        TimestampFormat,
    };
}

pub use crate::appenders::{
    AsyncAppender, ConsoleAppender, ConsoleTarget, FileAppender, FlushPolicy, WriterAppender,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::core::{
    log_manager, Appender, AppenderAttachable, AppenderRef, AppenderSkeleton,
    DefaultRepositorySelector, DenyAllFilter, ErrorCode, ErrorHandler, Filter, FilterChain,
    FilterDecision, Hierarchy, HierarchyConfig, HierarchyEventListener, JsonLayout, Layout, Level,
    LevelMatchFilter, LevelRangeFilter, Logger, LoggerConfig, LoggerError, LoggerId, LoggingEvent,
    OnlyOnceErrorHandler, RendererMap, RepositorySelector, ResourceBundle, Result, SelectorGuard,
    SimpleLayout, StringMatchFilter, TextLayout, TimestampFormat, LINE_SEP, ROOT_LOGGER_NAME,
};
