//! Error types for the logger hierarchy

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A string that names no known level
    #[error("Could not convert [{0}] to Level")]
    InvalidLevel(String),

    /// Encoding label not recognized
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Appender needs a layout but none was set
    #[error("No layout set for the appender named [{appender}]")]
    MissingLayout { appender: String },

    /// Appender has no output stream
    #[error("No output stream or file set for the appender named [{appender}]")]
    MissingWriter { appender: String },

    /// Append attempted after close
    #[error("Attempted to append to closed appender named [{appender}]")]
    AppenderClosed { appender: String },

    /// Repository selector replaced without the guard
    #[error("Attempted to reset the repository selector without possessing the guard")]
    GuardViolation,

    /// No repository selector installed yet
    #[error("Logger repository not initialized; call log_manager::init() first")]
    NotInitialized,

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// Channel send error
    #[error("Failed to send log event to async worker")]
    ChannelSendError,
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn invalid_level(value: impl Into<String>) -> Self {
        LoggerError::InvalidLevel(value.into())
    }

    pub fn missing_layout(appender: impl Into<String>) -> Self {
        LoggerError::MissingLayout {
            appender: appender.into(),
        }
    }

    pub fn missing_writer(appender: impl Into<String>) -> Self {
        LoggerError::MissingWriter {
            appender: appender.into(),
        }
    }

    pub fn appender_closed(appender: impl Into<String>) -> Self {
        LoggerError::AppenderClosed {
            appender: appender.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }
}
