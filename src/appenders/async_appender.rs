//! Asynchronous appender
//!
//! Events are queued on a bounded channel and handed to the nested appenders
//! by a dedicated worker thread, so the logging thread never waits on I/O
//! (unless the queue is full and the appender is set to block).

use crate::core::appender::{Appender, AppenderRef, AppenderSkeleton};
use crate::core::attachable::AppenderAttachable;
use crate::core::diagnostics;
use crate::core::error::LoggerError;
use crate::core::error_handler::ErrorCode;
use crate::core::event::LoggingEvent;
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default time `close` waits for the worker to drain the queue (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AsyncAppender {
    skeleton: AppenderSkeleton,
    nested: Arc<AppenderAttachable>,
    sender: Mutex<Option<Sender<LoggingEvent>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    blocking: AtomicBool,
    discarded: AtomicU64,
    buffer_size: usize,
    shutdown_timeout: Duration,
}

impl AsyncAppender {
    pub const DEFAULT_BUFFER_SIZE: usize = 128;

    pub fn new(name: impl Into<String>) -> Self {
        Self::with_buffer_size(name, Self::DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(name: impl Into<String>, buffer_size: usize) -> Self {
        let buffer_size = buffer_size.max(1);
        let (sender, receiver) = bounded::<LoggingEvent>(buffer_size);
        let nested = Arc::new(AppenderAttachable::new());
        let worker_nested = Arc::clone(&nested);

        let handle = thread::spawn(move || {
            for event in receiver {
                worker_nested.append_loop_on_appenders(&event);
            }
        });

        Self {
            skeleton: AppenderSkeleton::new(name),
            nested,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
            blocking: AtomicBool::new(true),
            discarded: AtomicU64::new(0),
            buffer_size,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Block the logging thread when the queue is full (the default) instead
    /// of discarding the event.
    #[must_use]
    pub fn with_blocking(self, blocking: bool) -> Self {
        self.blocking.store(blocking, Ordering::Relaxed);
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn set_blocking(&self, blocking: bool) {
        self.blocking.store(blocking, Ordering::Relaxed);
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking.load(Ordering::Relaxed)
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Events dropped because the queue was full.
    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    pub fn add_appender(&self, appender: AppenderRef) -> bool {
        self.nested.add_appender(appender)
    }

    pub fn remove_appender(&self, appender: &AppenderRef) -> Option<AppenderRef> {
        self.nested.remove_appender(appender)
    }

    pub fn remove_appender_by_name(&self, name: &str) -> Option<AppenderRef> {
        self.nested.remove_appender_by_name(name)
    }

    pub fn all_appenders(&self) -> Vec<AppenderRef> {
        self.nested.all_appenders()
    }

    pub fn appender(&self, name: &str) -> Option<AppenderRef> {
        self.nested.appender(name)
    }

    /// Wait for the worker to finish, at most `shutdown_timeout`.
    fn join_worker(&self) {
        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if handle.join().is_err() {
                    diagnostics::error(format!(
                        "Async worker of appender [{}] panicked during shutdown",
                        self.name()
                    ));
                }
                return;
            }
            if start.elapsed() >= self.shutdown_timeout {
                diagnostics::warn(format!(
                    "Async worker of appender [{}] did not finish within {:?}. Some events may be lost.",
                    self.name(),
                    self.shutdown_timeout
                ));
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Appender for AsyncAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        &self.skeleton
    }

    fn append(&self, event: &LoggingEvent) {
        let Some(sender) = self.sender.lock().clone() else {
            return;
        };

        let sent = if self.is_blocking() {
            sender.send(event.clone()).is_ok()
        } else {
            match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    self.discarded.fetch_add(1, Ordering::Relaxed);
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        };

        if !sent {
            let err = LoggerError::ChannelSendError;
            self.skeleton
                .report_error(&err.to_string(), Some(&err), ErrorCode::WriteFailure);
        }
    }

    /// Drain the queue into the nested appenders, then close them.
    fn close(&self) {
        if !self.skeleton.mark_closed() {
            return;
        }
        drop(self.sender.lock().take());
        self.join_worker();
        self.nested.remove_all_appenders();

        let discarded = self.discarded_count();
        if discarded > 0 {
            diagnostics::warn(format!(
                "Appender [{}] discarded {} events while its buffer was full",
                self.name(),
                discarded
            ));
        }
    }

    fn requires_layout(&self) -> bool {
        false
    }

    fn nested_appenders(&self) -> Option<&AppenderAttachable> {
        Some(&*self.nested)
    }
}

impl Drop for AsyncAppender {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AsyncAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncAppender")
            .field("skeleton", &self.skeleton)
            .field("nested", &self.nested)
            .field("buffer_size", &self.buffer_size)
            .field("blocking", &self.is_blocking())
            .field("discarded", &self.discarded_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::Level;
    use std::sync::mpsc;

    struct Collect {
        skeleton: AppenderSkeleton,
        seen: Mutex<Vec<String>>,
    }

    impl Collect {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                skeleton: AppenderSkeleton::new("collect"),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Appender for Collect {
        fn skeleton(&self) -> &AppenderSkeleton {
            &self.skeleton
        }

        fn append(&self, event: &LoggingEvent) {
            self.seen.lock().push(event.message.clone());
        }

        fn close(&self) {
            self.skeleton.mark_closed();
        }

        fn requires_layout(&self) -> bool {
            false
        }
    }

    /// Blocks the worker until released.
    struct Gate {
        skeleton: AppenderSkeleton,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Appender for Gate {
        fn skeleton(&self) -> &AppenderSkeleton {
            &self.skeleton
        }

        fn append(&self, _event: &LoggingEvent) {
            let _ = self.release.lock().recv();
        }

        fn close(&self) {
            self.skeleton.mark_closed();
        }

        fn requires_layout(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_close_drains_in_order() {
        let sink = Collect::new();
        let appender = AsyncAppender::with_buffer_size("async", 4);
        appender.add_appender(sink.clone());

        for i in 0..50 {
            appender.do_append(&LoggingEvent::new("x", Level::INFO, format!("m{}", i)));
        }
        appender.close();

        let seen = sink.seen.lock().clone();
        assert_eq!(seen.len(), 50);
        assert_eq!(seen[0], "m0");
        assert_eq!(seen[49], "m49");
        assert!(sink.is_closed());
        assert!(appender.all_appenders().is_empty());
    }

    #[test]
    fn test_discarding_when_full() {
        let (release, gate_rx) = mpsc::channel();
        let gate = Arc::new(Gate {
            skeleton: AppenderSkeleton::new("gate"),
            release: Mutex::new(gate_rx),
        });
        let appender = AsyncAppender::with_buffer_size("async", 1).with_blocking(false);
        appender.add_appender(gate);

        // The worker takes the first event and parks in the gate; the second
        // fills the queue; the rest are discarded.
        appender.do_append(&LoggingEvent::new("x", Level::INFO, "first"));
        let deadline = Instant::now() + Duration::from_secs(5);
        while appender.sender.lock().as_ref().map_or(0, |s| s.len()) != 0
            && Instant::now() < deadline
        {
            thread::sleep(Duration::from_millis(1));
        }
        for _ in 0..5 {
            appender.do_append(&LoggingEvent::new("x", Level::INFO, "more"));
        }
        assert_eq!(appender.discarded_count(), 4);

        for _ in 0..2 {
            release.send(()).unwrap();
        }
        appender.close();
    }

    #[test]
    fn test_exposes_nested_appenders() {
        let appender = AsyncAppender::new("async");
        appender.add_appender(Collect::new());
        assert_eq!(appender.nested_appenders().map(|n| n.len()), Some(1));
        assert!(!appender.requires_layout());
    }
}
