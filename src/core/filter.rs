//! Filter chains attached to appenders
//!
//! Each appender owns an ordered chain of [`Filter`]s. The chain is walked
//! front to back: the first `Deny` drops the event, the first `Accept` lets it
//! through without consulting the rest, and `Neutral` passes the decision on.
//! A chain that ends without a decisive verdict accepts.

use super::event::LoggingEvent;
use super::level::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Accept,
    Deny,
    Neutral,
}

pub trait Filter: Send + Sync {
    fn decide(&self, event: &LoggingEvent) -> FilterDecision;
}

impl<F> Filter for F
where
    F: Fn(&LoggingEvent) -> FilterDecision + Send + Sync,
{
    fn decide(&self, event: &LoggingEvent) -> FilterDecision {
        self(event)
    }
}

/// Owning, append-at-tail sequence of filters.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail in O(1).
    pub fn push(&mut self, filter: Box<dyn Filter>) {
        self.filters.push(filter);
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn head(&self) -> Option<&dyn Filter> {
        self.filters.first().map(|f| f.as_ref())
    }

    /// First decisive verdict, or `Neutral` when the chain is exhausted.
    pub fn decide(&self, event: &LoggingEvent) -> FilterDecision {
        for filter in &self.filters {
            match filter.decide(event) {
                FilterDecision::Neutral => continue,
                decisive => return decisive,
            }
        }
        FilterDecision::Neutral
    }

    pub fn accepts(&self, event: &LoggingEvent) -> bool {
        self.decide(event) != FilterDecision::Deny
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("len", &self.filters.len())
            .finish()
    }
}

/// Matches events of exactly one level.
#[derive(Debug, Clone)]
pub struct LevelMatchFilter {
    level: Level,
    accept_on_match: bool,
}

impl LevelMatchFilter {
    pub fn new(level: Level, accept_on_match: bool) -> Self {
        Self {
            level,
            accept_on_match,
        }
    }
}

impl Filter for LevelMatchFilter {
    fn decide(&self, event: &LoggingEvent) -> FilterDecision {
        if event.level != self.level {
            FilterDecision::Neutral
        } else if self.accept_on_match {
            FilterDecision::Accept
        } else {
            FilterDecision::Deny
        }
    }
}

/// Denies events outside `[min, max]`; inside the range either accepts or
/// stays neutral.
#[derive(Debug, Clone, Default)]
pub struct LevelRangeFilter {
    min: Option<Level>,
    max: Option<Level>,
    accept_on_match: bool,
}

impl LevelRangeFilter {
    pub fn new(min: Option<Level>, max: Option<Level>) -> Self {
        Self {
            min,
            max,
            accept_on_match: false,
        }
    }

    #[must_use]
    pub fn accept_on_match(mut self, accept: bool) -> Self {
        self.accept_on_match = accept;
        self
    }
}

impl Filter for LevelRangeFilter {
    fn decide(&self, event: &LoggingEvent) -> FilterDecision {
        if let Some(min) = self.min {
            if !event.level.is_greater_or_equal(&min) {
                return FilterDecision::Deny;
            }
        }
        if let Some(max) = self.max {
            if event.level > max {
                return FilterDecision::Deny;
            }
        }
        if self.accept_on_match {
            FilterDecision::Accept
        } else {
            FilterDecision::Neutral
        }
    }
}

/// Matches events whose message contains a substring.
#[derive(Debug, Clone)]
pub struct StringMatchFilter {
    needle: String,
    accept_on_match: bool,
}

impl StringMatchFilter {
    pub fn new(needle: impl Into<String>, accept_on_match: bool) -> Self {
        Self {
            needle: needle.into(),
            accept_on_match,
        }
    }
}

impl Filter for StringMatchFilter {
    fn decide(&self, event: &LoggingEvent) -> FilterDecision {
        if self.needle.is_empty() || !event.message.contains(&self.needle) {
            FilterDecision::Neutral
        } else if self.accept_on_match {
            FilterDecision::Accept
        } else {
            FilterDecision::Deny
        }
    }
}

/// Drops everything. Useful at the end of an accept-list chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllFilter;

impl Filter for DenyAllFilter {
    fn decide(&self, _event: &LoggingEvent) -> FilterDecision {
        FilterDecision::Deny
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(decision: FilterDecision) -> Box<dyn Filter> {
        Box::new(move |_: &LoggingEvent| decision)
    }

    fn chain(decisions: &[FilterDecision]) -> FilterChain {
        let mut chain = FilterChain::new();
        for d in decisions {
            chain.push(fixed(*d));
        }
        chain
    }

    fn event(level: Level, message: &str) -> LoggingEvent {
        LoggingEvent::new("test", level, message)
    }

    #[test]
    fn test_chain_verdicts() {
        use FilterDecision::*;
        let e = event(Level::INFO, "m");
        assert!(!chain(&[Neutral, Deny]).accepts(&e));
        assert!(chain(&[Neutral, Accept]).accepts(&e));
        assert!(chain(&[]).accepts(&e));
        assert!(chain(&[Neutral, Neutral, Neutral]).accepts(&e));
        assert!(chain(&[Accept, Deny]).accepts(&e));
    }

    #[test]
    fn test_clear_resets_chain() {
        let mut c = chain(&[FilterDecision::Deny]);
        assert_eq!(c.len(), 1);
        c.clear();
        assert!(c.is_empty());
        assert!(c.head().is_none());
        assert!(c.accepts(&event(Level::INFO, "m")));
    }

    #[test]
    fn test_level_match_filter() {
        let f = LevelMatchFilter::new(Level::WARN, false);
        assert_eq!(f.decide(&event(Level::WARN, "x")), FilterDecision::Deny);
        assert_eq!(f.decide(&event(Level::INFO, "x")), FilterDecision::Neutral);
    }

    #[test]
    fn test_level_range_filter() {
        let f = LevelRangeFilter::new(Some(Level::INFO), Some(Level::ERROR)).accept_on_match(true);
        assert_eq!(f.decide(&event(Level::DEBUG, "x")), FilterDecision::Deny);
        assert_eq!(f.decide(&event(Level::WARN, "x")), FilterDecision::Accept);
        assert_eq!(f.decide(&event(Level::FATAL, "x")), FilterDecision::Deny);
    }

    #[test]
    fn test_string_match_with_deny_all() {
        let mut c = FilterChain::new();
        c.push(Box::new(StringMatchFilter::new("payment", true)));
        c.push(Box::new(DenyAllFilter));
        assert!(c.accepts(&event(Level::INFO, "payment received")));
        assert!(!c.accepts(&event(Level::INFO, "heartbeat")));
    }
}
