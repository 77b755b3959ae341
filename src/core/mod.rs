//! Core logger types and traits

pub mod appender;
pub mod attachable;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod error_handler;
pub mod event;
pub mod filter;
pub mod hierarchy;
pub mod layout;
pub mod level;
pub mod log_manager;
pub mod logger;
pub mod options;
pub mod renderer;
pub mod timestamp;

pub use appender::{Appender, AppenderRef, AppenderSkeleton};
pub use attachable::AppenderAttachable;
pub use config::{HierarchyConfig, LoggerConfig};
pub use error::{LoggerError, Result};
pub use error_handler::{ErrorCode, ErrorHandler, OnlyOnceErrorHandler};
pub use event::LoggingEvent;
pub use filter::{
    DenyAllFilter, Filter, FilterChain, FilterDecision, LevelMatchFilter, LevelRangeFilter,
    StringMatchFilter,
};
pub use hierarchy::{Hierarchy, HierarchyEventListener, LoggerId, ROOT_LOGGER_NAME};
pub use layout::{JsonLayout, Layout, SimpleLayout, TextLayout, LINE_SEP};
pub use level::Level;
pub use log_manager::{DefaultRepositorySelector, RepositorySelector, SelectorGuard};
pub use logger::{Logger, ResourceBundle};
pub use renderer::RendererMap;
pub use timestamp::TimestampFormat;
