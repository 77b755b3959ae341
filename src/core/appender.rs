//! Appender contract and the state every appender shares
//!
//! Concrete appenders embed an [`AppenderSkeleton`] (name, layout, threshold,
//! filter chain, error handler, closed flag) and implement the sink-specific
//! [`Appender::append`]. The provided [`Appender::do_append`] is the only
//! entry point the dispatch pipeline uses: it serializes appends per
//! appender, rejects appends after close, applies the threshold and walks the
//! filter chain before handing the event over.

use super::attachable::AppenderAttachable;
use super::diagnostics;
use super::error::LoggerError;
use super::error_handler::{ErrorCode, ErrorHandler, OnlyOnceErrorHandler};
use super::event::LoggingEvent;
use super::filter::{Filter, FilterChain};
use super::layout::Layout;
use super::level::Level;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared handle to an appender. Identity is the allocation, not the name.
pub type AppenderRef = Arc<dyn Appender>;

pub trait Appender: Send + Sync {
    fn skeleton(&self) -> &AppenderSkeleton;

    /// Deliver an event that already passed threshold and filters.
    ///
    /// Runs with the appender's append lock held. Failures go to the
    /// appender's error handler; nothing escapes to the caller.
    fn append(&self, event: &LoggingEvent);

    /// Release resources. Idempotent; a closed appender never reopens.
    fn close(&self);

    fn requires_layout(&self) -> bool;

    /// Appenders that forward to their own attached appenders expose them here
    /// so a repository shutdown can close them ahead of plain appenders.
    fn nested_appenders(&self) -> Option<&AppenderAttachable> {
        None
    }

    fn name(&self) -> String {
        self.skeleton().name()
    }

    fn is_closed(&self) -> bool {
        self.skeleton().is_closed()
    }

    fn do_append(&self, event: &LoggingEvent) {
        let skeleton = self.skeleton();
        let _guard = skeleton.lock_append();

        if skeleton.is_closed() {
            diagnostics::error(LoggerError::appender_closed(skeleton.name()).to_string());
            return;
        }
        if !skeleton.is_as_severe_as_threshold(event.level) {
            return;
        }
        if !skeleton.filters.read().accepts(event) {
            return;
        }
        self.append(event);
    }
}

pub struct AppenderSkeleton {
    name: RwLock<String>,
    layout: RwLock<Option<Arc<dyn Layout>>>,
    threshold: RwLock<Option<Level>>,
    filters: RwLock<FilterChain>,
    error_handler: RwLock<Arc<dyn ErrorHandler>>,
    closed: AtomicBool,
    append_lock: Mutex<()>,
}

impl AppenderSkeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: RwLock::new(name.into()),
            layout: RwLock::new(None),
            threshold: RwLock::new(None),
            filters: RwLock::new(FilterChain::new()),
            error_handler: RwLock::new(Arc::new(OnlyOnceErrorHandler::new())),
            closed: AtomicBool::new(false),
            append_lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    pub fn layout(&self) -> Option<Arc<dyn Layout>> {
        self.layout.read().clone()
    }

    pub fn set_layout(&self, layout: Option<Arc<dyn Layout>>) {
        *self.layout.write() = layout;
    }

    pub fn threshold(&self) -> Option<Level> {
        *self.threshold.read()
    }

    pub fn set_threshold(&self, threshold: Option<Level>) {
        *self.threshold.write() = threshold;
    }

    /// `true` when no threshold is set or `level` reaches it.
    pub fn is_as_severe_as_threshold(&self, level: Level) -> bool {
        match *self.threshold.read() {
            None => true,
            Some(threshold) => level.is_greater_or_equal(&threshold),
        }
    }

    /// Append a filter at the tail of the chain.
    ///
    /// Configuration-time call: it does not take the append lock, so do not
    /// race it against in-flight appends you care about.
    pub fn add_filter(&self, filter: Box<dyn Filter>) {
        self.filters.write().push(filter);
    }

    pub fn clear_filters(&self) {
        self.filters.write().clear();
    }

    pub fn filter_count(&self) -> usize {
        self.filters.read().len()
    }

    pub fn error_handler(&self) -> Arc<dyn ErrorHandler> {
        Arc::clone(&*self.error_handler.read())
    }

    pub fn set_error_handler(&self, handler: Arc<dyn ErrorHandler>) {
        let _guard = self.append_lock.lock();
        *self.error_handler.write() = handler;
    }

    /// Route a delivery failure to the error handler.
    pub fn report_error(&self, message: &str, cause: Option<&LoggerError>, code: ErrorCode) {
        self.error_handler().error(message, cause, code);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Flip to closed. Returns `true` only for the call that did the flip.
    pub fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub fn lock_append(&self) -> MutexGuard<'_, ()> {
        self.append_lock.lock()
    }
}

impl std::fmt::Debug for AppenderSkeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppenderSkeleton")
            .field("name", &*self.name.read())
            .field("threshold", &*self.threshold.read())
            .field("filters", &self.filter_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
