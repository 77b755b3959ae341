//! Process-wide access to the current logger repository
//!
//! Nothing is installed until [`init`] runs (or a selector is set
//! explicitly). The selector can be swapped at runtime; whoever installs it
//! with a [`SelectorGuard`] is the only one allowed to replace it afterwards.

use super::error::{LoggerError, Result};
use super::hierarchy::Hierarchy;
use super::level::Level;
use super::logger::Logger;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Chooses the repository that the free functions of this module operate on.
pub trait RepositorySelector: Send + Sync {
    fn logger_repository(&self) -> Hierarchy;
}

/// Always hands out the same repository.
#[derive(Debug, Clone)]
pub struct DefaultRepositorySelector {
    repository: Hierarchy,
}

impl DefaultRepositorySelector {
    pub fn new(repository: Hierarchy) -> Self {
        Self { repository }
    }
}

impl RepositorySelector for DefaultRepositorySelector {
    fn logger_repository(&self) -> Hierarchy {
        self.repository.clone()
    }
}

/// Opaque token proving ownership of the installed selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectorGuard(u64);

impl SelectorGuard {
    /// Mint a guard distinct from every other guard of this process.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        static NEXT_GUARD: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_GUARD.fetch_add(1, Ordering::Relaxed))
    }
}

struct State {
    selector: Arc<dyn RepositorySelector>,
    guard: Option<SelectorGuard>,
}

static STATE: RwLock<Option<State>> = parking_lot::const_rwlock(None);

/// Install the default selector over a fresh repository (root at DEBUG).
///
/// Does nothing when a selector is already installed. Returns the current
/// repository either way.
pub fn init() -> Hierarchy {
    let mut state = STATE.write();
    let state = state.get_or_insert_with(|| State {
        selector: Arc::new(DefaultRepositorySelector::new(Hierarchy::new(Level::DEBUG))),
        guard: None,
    });
    state.selector.logger_repository()
}

/// Replace the selector.
///
/// Fails with [`LoggerError::GuardViolation`] when the installed selector is
/// guarded by a different guard. `guard` becomes the new guard.
pub fn set_repository_selector(
    selector: Arc<dyn RepositorySelector>,
    guard: Option<SelectorGuard>,
) -> Result<()> {
    let mut state = STATE.write();
    if let Some(current) = state.as_ref().and_then(|s| s.guard) {
        if Some(current) != guard {
            return Err(LoggerError::GuardViolation);
        }
    }
    *state = Some(State { selector, guard });
    Ok(())
}

pub fn logger_repository() -> Result<Hierarchy> {
    STATE
        .read()
        .as_ref()
        .map(|state| state.selector.logger_repository())
        .ok_or(LoggerError::NotInitialized)
}

pub fn get_logger(name: &str) -> Result<Logger> {
    Ok(logger_repository()?.get_logger(name))
}

pub fn root_logger() -> Result<Logger> {
    Ok(logger_repository()?.root_logger())
}

pub fn exists(name: &str) -> Result<Option<Logger>> {
    Ok(logger_repository()?.exists(name))
}

pub fn current_loggers() -> Result<Vec<Logger>> {
    Ok(logger_repository()?.current_loggers())
}

pub fn shutdown() -> Result<()> {
    logger_repository()?.shutdown();
    Ok(())
}

pub fn reset_configuration() -> Result<()> {
    logger_repository()?.reset_configuration();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the manager state is process-global.
    #[test]
    fn test_lifecycle() {
        assert!(matches!(logger_repository(), Err(LoggerError::NotInitialized)));
        assert!(get_logger("x").is_err());

        let first = init();
        let again = init();
        assert!(first.ptr_eq(&again));
        assert_eq!(root_logger().unwrap().level(), Some(Level::DEBUG));

        let a = get_logger("a.b").unwrap();
        assert_eq!(exists("a.b").unwrap(), Some(a));
        assert_eq!(current_loggers().unwrap().len(), 1);

        let owner = SelectorGuard::new();
        let replacement = Hierarchy::new(Level::WARN);
        set_repository_selector(
            Arc::new(DefaultRepositorySelector::new(replacement.clone())),
            Some(owner),
        )
        .unwrap();
        assert!(logger_repository().unwrap().ptr_eq(&replacement));

        let intruder = SelectorGuard::new();
        let err = set_repository_selector(
            Arc::new(DefaultRepositorySelector::new(Hierarchy::default())),
            Some(intruder),
        )
        .unwrap_err();
        assert!(matches!(err, LoggerError::GuardViolation));
        assert!(set_repository_selector(
            Arc::new(DefaultRepositorySelector::new(Hierarchy::default())),
            None,
        )
        .is_err());
        assert!(logger_repository().unwrap().ptr_eq(&replacement));

        set_repository_selector(Arc::new(DefaultRepositorySelector::new(first.clone())), Some(owner))
            .unwrap();
        assert!(logger_repository().unwrap().ptr_eq(&first));
        reset_configuration().unwrap();
        shutdown().unwrap();
    }
}
