//! Logger handles and the event dispatch walk
//!
//! A [`Logger`] is a cheap, clonable handle to one node of a [`Hierarchy`].
//! Nodes are owned by the repository; a handle that outlives its repository
//! keeps working as a no-op.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_log_hierarchy::appenders::WriterAppender;
//! use rust_log_hierarchy::{Hierarchy, Level, SimpleLayout};
//!
//! let h = Hierarchy::new(Level::INFO);
//! let console = Arc::new(WriterAppender::with_writer(
//!     "out",
//!     Arc::new(SimpleLayout),
//!     std::io::sink(),
//! ));
//! h.root_logger().add_appender(console);
//!
//! let db = h.get_logger("app.db");
//! db.info("connected");             // reaches the root's appender
//! db.debug("pool stats");           // below the inherited INFO level
//! assert_eq!(db.effective_level(), Level::INFO);
//! ```

use super::appender::AppenderRef;
use super::attachable::AppenderAttachable;
use super::diagnostics;
use super::event::LoggingEvent;
use super::hierarchy::{Hierarchy, LoggerId, Shared};
use super::level::Level;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Localized message templates keyed by message key.
pub type ResourceBundle = HashMap<String, String>;

pub(crate) struct LoggerNode {
    pub(crate) id: LoggerId,
    pub(crate) name: String,
    level: RwLock<Option<Level>>,
    additive: AtomicBool,
    resource_bundle: RwLock<Option<Arc<ResourceBundle>>>,
    pub(crate) appenders: AppenderAttachable,
    repository: Weak<Shared>,
}

impl LoggerNode {
    pub(crate) fn new(
        id: LoggerId,
        name: String,
        level: Option<Level>,
        repository: Weak<Shared>,
    ) -> Self {
        Self {
            id,
            name,
            level: RwLock::new(level),
            additive: AtomicBool::new(true),
            resource_bundle: RwLock::new(None),
            appenders: AppenderAttachable::new(),
            repository,
        }
    }

    pub(crate) fn level(&self) -> Option<Level> {
        *self.level.read()
    }

    /// Close the appenders that own nested appenders, leaving them attached.
    pub(crate) fn close_nested_appenders(&self) {
        for appender in self.appenders.all_appenders() {
            if appender.nested_appenders().is_some() {
                appender.close();
            }
        }
    }
}

/// Handle to a named logger. Clones share the same logger; equality is
/// identity.
#[derive(Clone)]
pub struct Logger {
    node: Arc<LoggerNode>,
}

impl Logger {
    pub(crate) fn from_node(node: Arc<LoggerNode>) -> Self {
        Self { node }
    }

    /// Full dotted name, or [`ROOT_LOGGER_NAME`](crate::ROOT_LOGGER_NAME)
    /// for the root.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Arena slot of this logger in its repository.
    pub fn id(&self) -> LoggerId {
        self.node.id
    }

    pub fn is_root(&self) -> bool {
        self.node.id == LoggerId::ROOT
    }

    /// The owning repository, unless it has been dropped.
    pub fn repository(&self) -> Option<Hierarchy> {
        self.node.repository.upgrade().map(Hierarchy::from_shared)
    }

    /// Nearest registered ancestor. `None` for the root.
    pub fn parent(&self) -> Option<Logger> {
        self.repository()?.parent_of(self.node.id)
    }

    /// Explicitly assigned level, if any.
    pub fn level(&self) -> Option<Level> {
        self.node.level()
    }

    /// Assign or clear the level. The root must always keep one.
    pub fn set_level(&self, level: Option<Level>) {
        if level.is_none() && self.is_root() {
            diagnostics::error("You have tried to set a null level to root.");
            return;
        }
        *self.node.level.write() = level;
    }

    /// Level of the nearest ancestor (or self) that has one assigned.
    pub fn effective_level(&self) -> Level {
        match self.repository() {
            Some(repository) => repository.effective_level(self.node.id),
            None => self.level().unwrap_or(Level::OFF),
        }
    }

    /// Whether events also travel to the parent's appenders. On by default.
    pub fn additivity(&self) -> bool {
        self.node.additive.load(Ordering::Acquire)
    }

    pub fn set_additivity(&self, additive: bool) {
        self.node.additive.store(additive, Ordering::Release);
    }

    /// Attach an appender. Re-adding an attached instance does nothing.
    pub fn add_appender(&self, appender: AppenderRef) {
        if self.node.appenders.add_appender(Arc::clone(&appender)) {
            if let Some(repository) = self.repository() {
                repository.fire_add_appender_event(self, &appender);
            }
        }
    }

    /// Detach `appender` without closing it.
    pub fn remove_appender(&self, appender: &AppenderRef) -> Option<AppenderRef> {
        let removed = self.node.appenders.remove_appender(appender)?;
        if let Some(repository) = self.repository() {
            repository.fire_remove_appender_event(self, &removed);
        }
        Some(removed)
    }

    /// Detach the first appender called `name` without closing it.
    pub fn remove_appender_by_name(&self, name: &str) -> Option<AppenderRef> {
        let removed = self.node.appenders.remove_appender_by_name(name)?;
        if let Some(repository) = self.repository() {
            repository.fire_remove_appender_event(self, &removed);
        }
        Some(removed)
    }

    /// Close and detach every appender of this logger.
    pub fn remove_all_appenders(&self) {
        self.node.appenders.remove_all_appenders();
    }

    /// First attached appender called `name`.
    pub fn appender(&self, name: &str) -> Option<AppenderRef> {
        self.node.appenders.appender(name)
    }

    /// Attached appenders in attachment order. Ancestors' are not included.
    pub fn all_appenders(&self) -> Vec<AppenderRef> {
        self.node.appenders.all_appenders()
    }

    pub fn is_attached(&self, appender: &AppenderRef) -> bool {
        self.node.appenders.is_attached(appender)
    }

    /// Hand `event` to this logger's appenders, then to each ancestor's,
    /// stopping after the first non-additive logger.
    ///
    /// Returns how many appenders were reached. When none were, the
    /// repository prints its one-time "no appenders" warning.
    pub fn call_appenders(&self, event: &LoggingEvent) -> usize {
        let repository = self.repository();
        let mut writes = 0;
        let mut current = Some(self.clone());

        while let Some(logger) = current {
            writes += logger.node.appenders.append_loop_on_appenders(event);
            if !logger.additivity() {
                break;
            }
            current = repository
                .as_ref()
                .and_then(|repository| repository.parent_of(logger.node.id));
        }

        if writes == 0 {
            if let Some(repository) = &repository {
                repository.emit_no_appender_warning(self.name());
            }
        }
        writes
    }

    /// Whether an event at `level` would be dispatched: the repository
    /// threshold lets it through and it reaches the effective level.
    pub fn is_enabled_for(&self, level: Level) -> bool {
        let Some(repository) = self.repository() else {
            return false;
        };
        if repository.is_disabled(level.value()) {
            return false;
        }
        level.is_greater_or_equal(&repository.effective_level(self.node.id))
    }

    pub fn is_trace_enabled(&self) -> bool {
        self.is_enabled_for(Level::TRACE)
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.is_enabled_for(Level::DEBUG)
    }

    pub fn is_info_enabled(&self) -> bool {
        self.is_enabled_for(Level::INFO)
    }

    /// Dispatch `message` at `level` if [`is_enabled_for`](Self::is_enabled_for)
    /// allows it.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_hierarchy::{Hierarchy, Level};
    ///
    /// let h = Hierarchy::default();
    /// let logger = h.get_logger("jobs");
    /// logger.set_level(Some(Level::WARN));
    /// logger.log(Level::ERROR, "job 17 failed");
    /// logger.log(Level::INFO, "dropped: below WARN");
    /// ```
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if self.is_enabled_for(level) {
            self.forced_log(LoggingEvent::new(self.name(), level, message));
        }
    }

    /// Log with `error` and its source chain as the throwable.
    pub fn log_with_error(
        &self,
        level: Level,
        message: impl Into<String>,
        error: &dyn std::error::Error,
    ) {
        if self.is_enabled_for(level) {
            self.forced_log(LoggingEvent::new(self.name(), level, message).with_error(error));
        }
    }

    /// Dispatch `event` without any level check.
    pub fn forced_log(&self, event: LoggingEvent) {
        self.call_appenders(&event);
    }

    /// Shorthands for [`log`](Self::log) at a fixed level.
    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::TRACE, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::INFO, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::ERROR, message);
    }

    pub fn fatal(&self, message: impl Into<String>) {
        self.log(Level::FATAL, message);
    }

    /// Log `message` at ERROR when `assertion` is false.
    pub fn assert_log(&self, assertion: bool, message: impl Into<String>) {
        if !assertion {
            self.error(message);
        }
    }

    /// Log a value, rendered by the repository's renderer for its type or by
    /// its `Debug` representation.
    pub fn log_object<T: Any + Debug>(&self, level: Level, value: &T) {
        if !self.is_enabled_for(level) {
            return;
        }
        let message = self
            .repository()
            .and_then(|repository| repository.render(value))
            .unwrap_or_else(|| format!("{:?}", value));
        self.forced_log(LoggingEvent::new(self.name(), level, message));
    }

    /// Install or clear this logger's own message bundle. Descendants without
    /// a bundle of their own use it too.
    pub fn set_resource_bundle(&self, bundle: Option<Arc<ResourceBundle>>) {
        *self.node.resource_bundle.write() = bundle;
    }

    /// Bundle of this logger or its nearest ancestor that has one.
    pub fn resource_bundle(&self) -> Option<Arc<ResourceBundle>> {
        let mut current = Some(self.clone());
        while let Some(logger) = current {
            if let Some(bundle) = logger.node.resource_bundle.read().clone() {
                return Some(bundle);
            }
            current = logger.parent();
        }
        None
    }

    /// Look up `key` in [`resource_bundle`](Self::resource_bundle).
    pub fn resource_bundle_string(&self, key: &str) -> Option<String> {
        self.resource_bundle()?.get(key).cloned()
    }

    /// Log the localized message for `key`, or the key itself when no bundle
    /// has it.
    pub fn l7dlog(&self, level: Level, key: &str) {
        if !self.is_enabled_for(level) {
            return;
        }
        let message = self.resource_bundle_string(key).unwrap_or_else(|| {
            diagnostics::debug(format!("No resource for key [{}] in logger [{}]", key, self.name()));
            key.to_string()
        });
        self.forced_log(LoggingEvent::new(self.name(), level, message));
    }
}

impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Logger {}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.node.name)
            .field("level", &self.level())
            .field("additive", &self.additivity())
            .field("appenders", &self.node.appenders)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::appender::{Appender, AppenderSkeleton};
    use parking_lot::Mutex;

    struct Capture {
        skeleton: AppenderSkeleton,
        events: Mutex<Vec<(String, Level, String)>>,
    }

    impl Capture {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                skeleton: AppenderSkeleton::new(name),
                events: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.events.lock().iter().map(|e| e.2.clone()).collect()
        }
    }

    impl Appender for Capture {
        fn skeleton(&self) -> &AppenderSkeleton {
            &self.skeleton
        }

        fn append(&self, event: &LoggingEvent) {
            self.events.lock().push((
                event.logger_name.clone(),
                event.level,
                event.message.clone(),
            ));
        }

        fn close(&self) {
            self.skeleton.mark_closed();
        }

        fn requires_layout(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_additivity_stops_walk() {
        let h = Hierarchy::default();
        let root_sink = Capture::new("root");
        let a_sink = Capture::new("a");
        h.root_logger().add_appender(root_sink.clone());
        let a = h.get_logger("a");
        a.add_appender(a_sink.clone());
        let ab = h.get_logger("a.b");

        ab.info("one");
        a.set_additivity(false);
        ab.info("two");

        assert_eq!(a_sink.messages(), vec!["one", "two"]);
        assert_eq!(root_sink.messages(), vec!["one"]);
    }

    #[test]
    fn test_level_gate_uses_inherited_level() {
        let h = Hierarchy::new(Level::WARN);
        let sink = Capture::new("sink");
        h.root_logger().add_appender(sink.clone());
        let logger = h.get_logger("svc.db");

        logger.info("hidden");
        logger.error("shown");
        assert_eq!(sink.messages(), vec!["shown"]);

        logger.set_level(Some(Level::TRACE));
        assert!(logger.is_trace_enabled());
        logger.trace("now shown");
        assert_eq!(sink.messages().len(), 2);
    }

    #[test]
    fn test_root_level_cannot_be_cleared() {
        let h = Hierarchy::new(Level::INFO);
        h.root_logger().set_level(None);
        assert_eq!(h.root_logger().level(), Some(Level::INFO));
    }

    #[test]
    fn test_forced_log_skips_level_check() {
        let h = Hierarchy::new(Level::OFF);
        let sink = Capture::new("sink");
        let logger = h.get_logger("x");
        logger.add_appender(sink.clone());

        logger.fatal("dropped");
        logger.forced_log(LoggingEvent::new("x", Level::DEBUG, "forced"));
        assert_eq!(sink.messages(), vec!["forced"]);
    }

    #[test]
    fn test_log_object_uses_renderer() {
        #[derive(Debug)]
        struct Order(u32);

        let h = Hierarchy::default();
        let sink = Capture::new("sink");
        let logger = h.get_logger("orders");
        logger.add_appender(sink.clone());

        logger.log_object(Level::INFO, &Order(1));
        h.add_renderer::<Order, _>(|o| format!("order #{}", o.0));
        logger.log_object(Level::INFO, &Order(2));

        assert_eq!(sink.messages(), vec!["Order(1)", "order #2"]);
    }

    #[test]
    fn test_l7dlog_inherits_bundle() {
        let h = Hierarchy::default();
        let sink = Capture::new("sink");
        let parent = h.get_logger("app");
        let child = h.get_logger("app.web");
        child.add_appender(sink.clone());

        let mut bundle = ResourceBundle::new();
        bundle.insert("greeting".to_string(), "hello".to_string());
        parent.set_resource_bundle(Some(Arc::new(bundle)));

        child.l7dlog(Level::INFO, "greeting");
        child.l7dlog(Level::INFO, "missing");
        assert_eq!(sink.messages(), vec!["hello", "missing"]);
    }

    #[test]
    fn test_handle_outliving_repository_is_inert() {
        let logger = {
            let h = Hierarchy::default();
            h.get_logger("orphan")
        };
        assert!(logger.repository().is_none());
        assert!(logger.parent().is_none());
        assert!(!logger.is_enabled_for(Level::FATAL));
        assert_eq!(logger.call_appenders(&LoggingEvent::new("orphan", Level::INFO, "m")), 0);
    }
}
