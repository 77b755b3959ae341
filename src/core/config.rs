//! Declarative hierarchy settings
//!
//! [`HierarchyConfig`] is plain data: any serde format can produce it, and
//! [`HierarchyConfig::apply`] installs it on a repository.

use super::error::{LoggerError, Result};
use super::hierarchy::Hierarchy;
use super::level::Level;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const THRESHOLD_ENV: &str = "RUST_LOG_HIERARCHY_THRESHOLD";
pub const ROOT_LEVEL_ENV: &str = "RUST_LOG_HIERARCHY_ROOT_LEVEL";

fn default_additivity() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// `None` makes the logger inherit its level.
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default = "default_additivity")]
    pub additivity: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: None,
            additivity: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    pub threshold: Option<Level>,
    pub root_level: Option<Level>,
    pub loggers: BTreeMap<String, LoggerConfig>,
}

impl HierarchyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: Level) -> Self {
        self.threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn with_root_level(mut self, level: Level) -> Self {
        self.root_level = Some(level);
        self
    }

    #[must_use]
    pub fn with_logger(mut self, name: impl Into<String>, config: LoggerConfig) -> Self {
        self.loggers.insert(name.into(), config);
        self
    }

    /// Threshold and root level from the environment. Unset variables leave
    /// the field empty; unparseable ones are an error.
    pub fn from_env() -> Result<Self> {
        fn level_var(key: &str) -> Result<Option<Level>> {
            match std::env::var(key) {
                Ok(value) => value.parse().map(Some),
                Err(std::env::VarError::NotPresent) => Ok(None),
                Err(e) => Err(LoggerError::config(key, e.to_string())),
            }
        }

        Ok(Self {
            threshold: level_var(THRESHOLD_ENV)?,
            root_level: level_var(ROOT_LEVEL_ENV)?,
            loggers: BTreeMap::new(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Install these settings. Loggers not mentioned are left untouched.
    pub fn apply(&self, hierarchy: &Hierarchy) {
        if let Some(threshold) = self.threshold {
            hierarchy.set_threshold(threshold);
        }
        if let Some(level) = self.root_level {
            hierarchy.root_logger().set_level(Some(level));
        }
        for (name, config) in &self.loggers {
            let logger = hierarchy.get_logger(name);
            logger.set_level(config.level);
            logger.set_additivity(config.additivity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let h = Hierarchy::default();
        HierarchyConfig::new()
            .with_threshold(Level::INFO)
            .with_root_level(Level::WARN)
            .with_logger(
                "db",
                LoggerConfig {
                    level: Some(Level::TRACE),
                    additivity: false,
                },
            )
            .apply(&h);

        assert_eq!(h.threshold(), Level::INFO);
        assert_eq!(h.root_logger().level(), Some(Level::WARN));
        let db = h.exists("db").unwrap();
        assert_eq!(db.level(), Some(Level::TRACE));
        assert!(!db.additivity());
    }

    #[test]
    fn test_json_defaults() {
        let config = HierarchyConfig::from_json(
            r#"{ "root_level": "info", "loggers": { "a.b": { "level": "Error" }, "c": {} } }"#,
        )
        .unwrap();

        assert_eq!(config.threshold, None);
        assert_eq!(config.root_level, Some(Level::INFO));
        assert_eq!(config.loggers["a.b"].level, Some(Level::ERROR));
        assert!(config.loggers["a.b"].additivity);
        assert_eq!(config.loggers["c"], LoggerConfig::default());

        let round = HierarchyConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(round, config);
    }

    #[test]
    fn test_bad_level_rejected() {
        let err = HierarchyConfig::from_json(r#"{ "threshold": "LOUD" }"#).unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }
}
