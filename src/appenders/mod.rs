//! Appender implementations

pub mod async_appender;
pub mod console;
pub mod file;
pub mod writer;

pub use async_appender::{AsyncAppender, DEFAULT_SHUTDOWN_TIMEOUT};
pub use console::{ConsoleAppender, ConsoleTarget};
pub use file::FileAppender;
pub use writer::{BoxedWriter, FlushPolicy, WriterAppender};

pub use crate::core::Appender;
