//! Logger repository
//!
//! A [`Hierarchy`] owns every logger of one namespace. Loggers live in an
//! arena indexed by [`LoggerId`]; parent links are ids into that arena, never
//! owning pointers, and each node only holds a weak reference back to the
//! repository.
//!
//! Names are dotted paths. A logger may be requested before its ancestors
//! exist: the missing ancestor names are recorded as pending entries listing
//! the descendants waiting on them, and the first request for such a name
//! adopts those descendants. Whatever the registration order, once all names
//! are registered each logger's parent is its nearest registered ancestor, or
//! the root.
//!
//! Creation and parent resolution happen under the registry write lock as
//! one unit, so no thread ever sees a half-linked logger. Lookups of loggers
//! that already exist only take the read side.
//!
//! Creating a logger, [`Hierarchy::shutdown`] and
//! [`Hierarchy::reset_configuration`] are serialized by a lifecycle lock,
//! always taken before the registry lock. A logger is created either wholly
//! before a reset (and is then reset with the rest) or wholly after it.
//!
//! # Example
//!
//! ```
//! use rust_log_hierarchy::{Hierarchy, Level, ROOT_LOGGER_NAME};
//!
//! let h = Hierarchy::new(Level::INFO);
//! let child = h.get_logger("com.acme.db");
//! assert_eq!(child.parent().unwrap().name(), ROOT_LOGGER_NAME);
//!
//! // A late ancestor adopts the loggers already waiting on it.
//! let acme = h.get_logger("com.acme");
//! assert_eq!(child.parent().unwrap(), acme);
//! ```

use super::appender::AppenderRef;
use super::diagnostics;
use super::error::Result;
use super::level::Level;
use super::logger::{Logger, LoggerNode};
use super::renderer::RendererMap;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Weak};

pub const ROOT_LOGGER_NAME: &str = "root";

/// Stable handle of a logger inside its repository's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoggerId(usize);

impl LoggerId {
    pub const ROOT: LoggerId = LoggerId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Notified synchronously when appenders are attached to or detached from a
/// logger of the repository.
pub trait HierarchyEventListener: Send + Sync {
    fn add_appender_event(&self, logger: &Logger, appender: &AppenderRef);
    fn remove_appender_event(&self, logger: &Logger, appender: &AppenderRef);
}

enum Entry {
    Resolved(LoggerId),
    /// Name not created yet; descendants waiting to be adopted by it.
    Pending(Vec<LoggerId>),
}

struct Registry {
    nodes: Vec<Arc<LoggerNode>>,
    parents: Vec<Option<LoggerId>>,
    names: HashMap<String, Entry>,
}

impl Registry {
    fn node(&self, id: LoggerId) -> &Arc<LoggerNode> {
        &self.nodes[id.0]
    }

    fn push_node(&mut self, name: &str, repository: Weak<Shared>) -> LoggerId {
        let id = LoggerId(self.nodes.len());
        self.nodes
            .push(Arc::new(LoggerNode::new(id, name.to_string(), None, repository)));
        self.parents.push(None);
        id
    }

    /// `true` when `id` is `ancestor_name` itself or lies below it. The root is
    /// below nothing.
    fn is_at_or_below(&self, id: LoggerId, ancestor_name: &str) -> bool {
        if id == LoggerId::ROOT {
            return false;
        }
        self.node(id)
            .name
            .strip_prefix(ancestor_name)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }

    /// Re-link descendants that were waiting on `new_id`'s name.
    fn adopt_pending_children(&mut self, children: Vec<LoggerId>, new_id: LoggerId) {
        let new_name = self.node(new_id).name.clone();
        for child in children {
            let current = self.parents[child.0].unwrap_or(LoggerId::ROOT);
            if !self.is_at_or_below(current, &new_name) {
                self.parents[new_id.0] = Some(current);
                self.parents[child.0] = Some(new_id);
            }
        }
    }

    /// Link `id` to its nearest existing ancestor, registering it as pending
    /// under every missing ancestor name on the way up.
    fn resolve_parent(&mut self, id: LoggerId) {
        let name = self.node(id).name.clone();
        let mut parent = LoggerId::ROOT;

        for (dot, _) in name.rmatch_indices('.') {
            let prefix = &name[..dot];
            if let Some(entry) = self.names.get_mut(prefix) {
                match entry {
                    Entry::Resolved(ancestor) => {
                        parent = *ancestor;
                        break;
                    }
                    Entry::Pending(children) => children.push(id),
                }
            } else {
                self.names
                    .insert(prefix.to_string(), Entry::Pending(vec![id]));
            }
        }

        self.parents[id.0] = Some(parent);
    }
}

pub(crate) struct Shared {
    registry: RwLock<Registry>,
    lifecycle: Mutex<()>,
    threshold: RwLock<Level>,
    threshold_value: AtomicI32,
    listeners: RwLock<Vec<Arc<dyn HierarchyEventListener>>>,
    renderers: RwLock<RendererMap>,
    no_appender_warning_emitted: AtomicBool,
}

/// Cheaply clonable handle to a logger repository.
#[derive(Clone)]
pub struct Hierarchy {
    shared: Arc<Shared>,
}

impl Hierarchy {
    /// Create a repository whose root logger starts at `root_level`.
    ///
    /// Nothing is discovered or configured implicitly.
    pub fn new(root_level: Level) -> Self {
        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let root = LoggerNode::new(
                LoggerId::ROOT,
                ROOT_LOGGER_NAME.to_string(),
                Some(root_level),
                weak.clone(),
            );
            Shared {
                registry: RwLock::new(Registry {
                    nodes: vec![Arc::new(root)],
                    parents: vec![None],
                    names: HashMap::new(),
                }),
                lifecycle: Mutex::new(()),
                threshold: RwLock::new(Level::ALL),
                threshold_value: AtomicI32::new(Level::ALL.value()),
                listeners: RwLock::new(Vec::new()),
                renderers: RwLock::new(RendererMap::new()),
                no_appender_warning_emitted: AtomicBool::new(false),
            }
        });
        Self { shared }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Whether both handles refer to the same repository.
    pub fn ptr_eq(&self, other: &Hierarchy) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Return the logger called `name`, creating and linking it on first use.
    ///
    /// Repeated calls with the same name return handles to the same logger.
    /// A new logger starts with no level, no appenders and additivity on.
    ///
    /// Creation waits for a running [`shutdown`](Self::shutdown) or
    /// [`reset_configuration`](Self::reset_configuration) to finish. Looking
    /// up an existing logger never does.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_hierarchy::Hierarchy;
    ///
    /// let h = Hierarchy::default();
    /// let first = h.get_logger("net.http");
    /// let again = h.get_logger("net.http");
    /// assert_eq!(first, again);
    /// assert_eq!(first.level(), None);
    /// ```
    pub fn get_logger(&self, name: &str) -> Logger {
        if let Some(logger) = self.exists(name) {
            return logger;
        }

        let _lifecycle = self.shared.lifecycle.lock();
        let mut registry = self.shared.registry.write();
        if let Some(Entry::Resolved(id)) = registry.names.get(name) {
            return Logger::from_node(Arc::clone(registry.node(*id)));
        }

        let id = registry.push_node(name, Arc::downgrade(&self.shared));
        match registry.names.insert(name.to_string(), Entry::Resolved(id)) {
            None => {}
            Some(Entry::Pending(children)) => registry.adopt_pending_children(children, id),
            Some(Entry::Resolved(other)) => {
                diagnostics::error(format!(
                    "unexpected resolved entry {:?} replaced while creating logger [{}]",
                    other, name
                ));
            }
        }
        registry.resolve_parent(id);

        Logger::from_node(Arc::clone(registry.node(id)))
    }

    /// The logger called `name`, if it has been created.
    pub fn exists(&self, name: &str) -> Option<Logger> {
        let registry = self.shared.registry.read();
        match registry.names.get(name) {
            Some(Entry::Resolved(id)) => Some(Logger::from_node(Arc::clone(registry.node(*id)))),
            _ => None,
        }
    }

    /// Every created logger except the root, in creation order.
    pub fn current_loggers(&self) -> Vec<Logger> {
        let registry = self.shared.registry.read();
        registry.nodes[1..]
            .iter()
            .map(|node| Logger::from_node(Arc::clone(node)))
            .collect()
    }

    /// The root logger. It always exists, has no parent and always has a level.
    pub fn root_logger(&self) -> Logger {
        let registry = self.shared.registry.read();
        Logger::from_node(Arc::clone(registry.node(LoggerId::ROOT)))
    }

    pub(crate) fn parent_of(&self, id: LoggerId) -> Option<Logger> {
        let registry = self.shared.registry.read();
        registry.parents[id.0].map(|parent| Logger::from_node(Arc::clone(registry.node(parent))))
    }

    /// Nearest explicit level from `id` upwards, or the repository threshold.
    pub(crate) fn effective_level(&self, id: LoggerId) -> Level {
        let registry = self.shared.registry.read();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if let Some(level) = registry.node(node_id).level() {
                return level;
            }
            current = registry.parents[node_id.0];
        }
        self.threshold()
    }

    /// Disable every request below `level` across the whole repository,
    /// whatever the loggers' own levels say. [`Level::ALL`] disables nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_hierarchy::{Hierarchy, Level};
    ///
    /// let h = Hierarchy::default();
    /// h.set_threshold(Level::WARN);
    /// assert!(!h.get_logger("app").is_info_enabled());
    /// assert!(h.get_logger("app").is_enabled_for(Level::ERROR));
    /// ```
    pub fn set_threshold(&self, level: Level) {
        *self.shared.threshold.write() = level;
        self.shared
            .threshold_value
            .store(level.value(), Ordering::Release);
    }

    /// Parse and install a threshold. An unknown name leaves it unchanged.
    pub fn set_threshold_str(&self, level: &str) -> Result<()> {
        let level: Level = level.parse()?;
        self.set_threshold(level);
        Ok(())
    }

    /// The current repository threshold.
    pub fn threshold(&self) -> Level {
        *self.shared.threshold.read()
    }

    /// Repository-wide kill switch: `true` when the threshold is above
    /// `level_value`.
    #[inline]
    pub fn is_disabled(&self, level_value: i32) -> bool {
        self.shared.threshold_value.load(Ordering::Acquire) > level_value
    }

    /// Register a listener for appender attach and detach events. Adding the
    /// same listener twice is reported and ignored.
    pub fn add_hierarchy_event_listener(&self, listener: Arc<dyn HierarchyEventListener>) {
        let mut listeners = self.shared.listeners.write();
        if listeners
            .iter()
            .any(|l| std::ptr::addr_eq(Arc::as_ptr(l), Arc::as_ptr(&listener)))
        {
            diagnostics::warn("Ignoring attempt to add an existent listener.");
            return;
        }
        listeners.push(listener);
    }

    fn listeners(&self) -> Vec<Arc<dyn HierarchyEventListener>> {
        self.shared.listeners.read().clone()
    }

    /// Notify every listener that `appender` was attached to `logger`.
    pub fn fire_add_appender_event(&self, logger: &Logger, appender: &AppenderRef) {
        for listener in self.listeners() {
            listener.add_appender_event(logger, appender);
        }
    }

    /// Notify every listener that `appender` was detached from `logger`.
    pub fn fire_remove_appender_event(&self, logger: &Logger, appender: &AppenderRef) {
        for listener in self.listeners() {
            listener.remove_appender_event(logger, appender);
        }
    }

    /// Warn, once per repository, that an event reached no appender.
    pub fn emit_no_appender_warning(&self, logger_name: &str) {
        if self
            .shared
            .no_appender_warning_emitted
            .swap(true, Ordering::AcqRel)
        {
            return;
        }
        diagnostics::warn(format!(
            "No appenders could be found for logger ({}).",
            logger_name
        ));
        diagnostics::warn("Please initialize the logging system properly.");
    }

    /// Register how values of type `T` render in [`Logger::log_object`].
    pub fn add_renderer<T, F>(&self, render: F)
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.shared.renderers.write().put::<T, F>(render);
    }

    /// Render `value` with the renderer registered for its concrete type.
    pub fn render(&self, value: &dyn Any) -> Option<String> {
        self.shared.renderers.read().render(value)
    }

    pub fn renderer_map(&self) -> RendererMap {
        self.shared.renderers.read().clone()
    }

    fn all_nodes(&self) -> Vec<Arc<LoggerNode>> {
        self.shared.registry.read().nodes.clone()
    }

    /// Close every appender reachable from the root and all loggers, then
    /// detach them.
    ///
    /// Appenders that forward to nested appenders are closed first, so the
    /// nested ones drain before the plain pass closes anything they share.
    pub fn shutdown(&self) {
        let _lifecycle = self.shared.lifecycle.lock();
        self.shutdown_locked();
    }

    fn shutdown_locked(&self) {
        let nodes = self.all_nodes();
        for node in &nodes {
            node.close_nested_appenders();
        }
        for node in &nodes {
            node.appenders.remove_all_appenders();
        }
    }

    /// Return to the unconfigured state: root at DEBUG, every other logger
    /// inheriting and additive, threshold ALL, no renderers, no appenders.
    ///
    /// Holds the lifecycle lock throughout, so a concurrent
    /// [`get_logger`](Self::get_logger) creates its logger either before the
    /// reset starts or after it returns.
    pub fn reset_configuration(&self) {
        let _lifecycle = self.shared.lifecycle.lock();

        let root = self.root_logger();
        root.set_level(Some(Level::DEBUG));
        root.set_resource_bundle(None);
        self.set_threshold(Level::ALL);

        self.shutdown_locked();
        for logger in self.current_loggers() {
            logger.set_level(None);
            logger.set_additivity(true);
            logger.set_resource_bundle(None);
        }

        self.shared.renderers.write().clear();
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl std::fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.shared.registry.read();
        f.debug_struct("Hierarchy")
            .field("loggers", &registry.nodes.len())
            .field("threshold", &self.threshold())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent_name(logger: &Logger) -> String {
        logger.parent().expect("linked").name().to_string()
    }

    #[test]
    fn test_out_of_order_registration() {
        let h = Hierarchy::default();
        let abc = h.get_logger("a.b.c");
        let a = h.get_logger("a");
        let ab = h.get_logger("a.b");

        assert_eq!(parent_name(&abc), "a.b");
        assert_eq!(parent_name(&ab), "a");
        assert_eq!(parent_name(&a), ROOT_LOGGER_NAME);
        assert!(h.root_logger().parent().is_none());
    }

    #[test]
    fn test_siblings_adopted_by_late_ancestor() {
        let h = Hierarchy::default();
        let x = h.get_logger("com.acme.x");
        let y = h.get_logger("com.acme.y");
        let com = h.get_logger("com");
        let acme = h.get_logger("com.acme");

        assert_eq!(parent_name(&x), "com.acme");
        assert_eq!(parent_name(&y), "com.acme");
        assert_eq!(parent_name(&acme), "com");
        assert_eq!(parent_name(&com), ROOT_LOGGER_NAME);
    }

    #[test]
    fn test_root_parent_adopted_when_name_prefixes_root() {
        let h = Hierarchy::default();
        let rx = h.get_logger("r.x");
        let r = h.get_logger("r");
        assert_eq!(parent_name(&rx), "r");
        assert_eq!(parent_name(&r), ROOT_LOGGER_NAME);
    }

    #[test]
    fn test_string_prefix_sibling_not_taken_as_descendant() {
        let h = Hierarchy::default();
        let foobar = h.get_logger("com.foobar");
        let foo_child = h.get_logger("com.foo.child");
        let foo = h.get_logger("com.foo");

        assert_eq!(parent_name(&foo_child), "com.foo");
        assert_eq!(parent_name(&foobar), ROOT_LOGGER_NAME);
        assert_eq!(parent_name(&foo), ROOT_LOGGER_NAME);
    }

    #[test]
    fn test_get_logger_is_idempotent() {
        let h = Hierarchy::default();
        let first = h.get_logger("x.y");
        let second = h.get_logger("x.y");
        assert_eq!(first, second);
        assert_eq!(h.current_loggers().len(), 1);
    }

    #[test]
    fn test_pending_names_are_not_loggers() {
        let h = Hierarchy::default();
        h.get_logger("p.q.r");
        assert!(h.exists("p.q").is_none());
        assert!(h.exists("p").is_none());
        assert!(h.exists("p.q.r").is_some());
        assert_eq!(h.current_loggers().len(), 1);
    }

    #[test]
    fn test_threshold_kill_switch() {
        let h = Hierarchy::default();
        assert!(!h.is_disabled(Level::TRACE.value()));
        h.set_threshold(Level::WARN);
        assert!(h.is_disabled(Level::INFO.value()));
        assert!(!h.is_disabled(Level::WARN.value()));

        assert!(h.set_threshold_str("nonsense").is_err());
        assert_eq!(h.threshold(), Level::WARN);
        h.set_threshold_str("error").unwrap();
        assert_eq!(h.threshold(), Level::ERROR);
    }

    #[test]
    fn test_effective_level_walks_ancestors() {
        let h = Hierarchy::new(Level::INFO);
        let a = h.get_logger("a");
        let abc = h.get_logger("a.b.c");
        assert_eq!(abc.effective_level(), Level::INFO);
        a.set_level(Some(Level::ERROR));
        assert_eq!(abc.effective_level(), Level::ERROR);
    }

    #[test]
    fn test_creation_waits_for_lifecycle_operations() {
        let h = Hierarchy::default();
        h.get_logger("existing");

        let lifecycle = h.shared.lifecycle.lock();
        let creator = {
            let h = h.clone();
            std::thread::spawn(move || h.get_logger("late.arrival"))
        };
        // Existing loggers stay reachable while a reset or shutdown runs.
        assert!(h.exists("existing").is_some());
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(h.exists("late.arrival").is_none());

        drop(lifecycle);
        let late = creator.join().unwrap();
        assert_eq!(h.exists("late.arrival"), Some(late));
    }

    #[test]
    fn test_loggers_created_during_resets_end_up_default() {
        use crate::core::appender::{Appender, AppenderSkeleton};
        use crate::core::event::LoggingEvent;

        struct Sink(AppenderSkeleton);
        impl Appender for Sink {
            fn skeleton(&self) -> &AppenderSkeleton {
                &self.0
            }
            fn append(&self, _event: &LoggingEvent) {}
            fn close(&self) {
                self.0.mark_closed();
            }
            fn requires_layout(&self) -> bool {
                false
            }
        }

        let h = Hierarchy::default();
        let creators: Vec<_> = (0..4)
            .map(|t| {
                let h = h.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let logger = h.get_logger(&format!("t{t}.n{i}"));
                        logger.set_level(Some(Level::ERROR));
                    }
                })
            })
            .collect();
        for _ in 0..20 {
            h.reset_configuration();
        }
        for creator in creators {
            creator.join().unwrap();
        }

        let sink: AppenderRef = Arc::new(Sink(AppenderSkeleton::new("sink")));
        for logger in h.current_loggers() {
            logger.add_appender(Arc::clone(&sink));
        }
        h.reset_configuration();

        assert_eq!(h.current_loggers().len(), 200);
        assert!(sink.is_closed());
        for logger in h.current_loggers() {
            assert_eq!(logger.level(), None);
            assert!(logger.all_appenders().is_empty());
        }
    }

    #[test]
    fn test_renderers_cleared_by_reset() {
        let h = Hierarchy::default();
        h.add_renderer::<u16, _>(|v| format!("u16:{}", v));
        assert_eq!(h.render(&7u16).as_deref(), Some("u16:7"));
        h.reset_configuration();
        assert!(h.render(&7u16).is_none());
    }
}
