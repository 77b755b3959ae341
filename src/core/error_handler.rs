//! Delivery-failure reporting for appenders

use super::diagnostics;
use super::error::LoggerError;
use std::sync::atomic::{AtomicBool, Ordering};

/// Classification of a delivery failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    GenericFailure,
    WriteFailure,
    FlushFailure,
    CloseFailure,
    FileOpenFailure,
    MissingLayout,
}

/// Receives failures that happen while an appender delivers events.
///
/// Implementations must not panic: they are invoked from inside the append
/// path, and whatever they do is the last word on the failure.
pub trait ErrorHandler: Send + Sync {
    fn error(&self, message: &str, cause: Option<&LoggerError>, code: ErrorCode);
}

/// Reports the first failure to the diagnostics channel and drops the rest.
#[derive(Debug, Default)]
pub struct OnlyOnceErrorHandler {
    reported: AtomicBool,
}

impl OnlyOnceErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_reported(&self) -> bool {
        self.reported.load(Ordering::Relaxed)
    }
}

impl ErrorHandler for OnlyOnceErrorHandler {
    fn error(&self, message: &str, cause: Option<&LoggerError>, _code: ErrorCode) {
        if self.reported.swap(true, Ordering::AcqRel) {
            return;
        }
        match cause {
            Some(cause) => diagnostics::error_with(message, cause),
            None => diagnostics::error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_once_flips_on_first_report() {
        let handler = OnlyOnceErrorHandler::new();
        assert!(!handler.has_reported());
        handler.error("first", None, ErrorCode::WriteFailure);
        assert!(handler.has_reported());
        handler.error("second", None, ErrorCode::WriteFailure);
        assert!(handler.has_reported());
    }
}
