//! Ordered, duplicate-free set of appenders
//!
//! The member list is copy-on-write: dispatch clones the current `Arc` and
//! iterates without holding the lock, so a concurrent add or remove is seen
//! either entirely before or entirely after a given dispatch loop.

use super::appender::AppenderRef;
use super::event::LoggingEvent;
use parking_lot::RwLock;
use std::sync::Arc;

pub(crate) fn same_appender(a: &AppenderRef, b: &AppenderRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Appenders attached to one logger, or nested inside a forwarding appender.
///
/// Membership is by instance: two appenders with the same name are both
/// kept, the same `Arc` twice is not.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rust_log_hierarchy::appenders::WriterAppender;
/// use rust_log_hierarchy::{Appender, AppenderAttachable, AppenderRef, SimpleLayout};
///
/// let attached = AppenderAttachable::new();
/// let out: AppenderRef = Arc::new(WriterAppender::with_writer(
///     "out",
///     Arc::new(SimpleLayout),
///     std::io::sink(),
/// ));
/// assert!(attached.add_appender(Arc::clone(&out)));
/// assert!(!attached.add_appender(Arc::clone(&out)));
/// assert_eq!(attached.len(), 1);
///
/// attached.remove_all_appenders();
/// assert!(attached.is_empty());
/// assert!(out.is_closed());
/// ```
#[derive(Default)]
pub struct AppenderAttachable {
    appenders: RwLock<Arc<Vec<AppenderRef>>>,
}

impl AppenderAttachable {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Arc<Vec<AppenderRef>> {
        Arc::clone(&*self.appenders.read())
    }

    /// Attach `appender` unless this exact instance is already attached.
    ///
    /// Returns `true` when the appender was added.
    pub fn add_appender(&self, appender: AppenderRef) -> bool {
        let mut guard = self.appenders.write();
        if guard.iter().any(|a| same_appender(a, &appender)) {
            return false;
        }
        Arc::make_mut(&mut *guard).push(appender);
        true
    }

    /// Hand `event` to every member in attachment order.
    ///
    /// Returns the number of appenders visited.
    pub fn append_loop_on_appenders(&self, event: &LoggingEvent) -> usize {
        let appenders = self.snapshot();
        for appender in appenders.iter() {
            appender.do_append(event);
        }
        appenders.len()
    }

    /// Members in attachment order.
    pub fn all_appenders(&self) -> Vec<AppenderRef> {
        (*self.snapshot()).clone()
    }

    /// First attached appender with this name.
    pub fn appender(&self, name: &str) -> Option<AppenderRef> {
        self.snapshot().iter().find(|a| a.name() == name).cloned()
    }

    /// Whether this exact instance is a member.
    pub fn is_attached(&self, appender: &AppenderRef) -> bool {
        self.snapshot().iter().any(|a| same_appender(a, appender))
    }

    pub fn len(&self) -> usize {
        self.appenders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.appenders.read().is_empty()
    }

    /// Close every member, then detach them all.
    pub fn remove_all_appenders(&self) {
        let removed = std::mem::take(&mut *self.appenders.write());
        for appender in removed.iter() {
            appender.close();
        }
    }

    /// Detach without closing. Returns the removed handle.
    pub fn remove_appender(&self, appender: &AppenderRef) -> Option<AppenderRef> {
        let mut guard = self.appenders.write();
        let index = guard.iter().position(|a| same_appender(a, appender))?;
        Some(Arc::make_mut(&mut *guard).remove(index))
    }

    /// Detach the first appender with this name, without closing it.
    pub fn remove_appender_by_name(&self, name: &str) -> Option<AppenderRef> {
        let mut guard = self.appenders.write();
        let index = guard.iter().position(|a| a.name() == name)?;
        Some(Arc::make_mut(&mut *guard).remove(index))
    }
}

impl std::fmt::Debug for AppenderAttachable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.snapshot().iter().map(|a| a.name()).collect();
        f.debug_struct("AppenderAttachable")
            .field("appenders", &names)
            .finish()
    }
}
