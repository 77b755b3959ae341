//! Severity levels
//!
//! A [`Level`] is a named point on an integer severity scale. Two levels are
//! equal, and order against each other, purely by magnitude: a custom level
//! named `"NOTICE"` with magnitude `20000` compares equal to [`Level::INFO`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::error::LoggerError;

#[derive(Debug, Clone, Copy)]
pub struct Level {
    name: &'static str,
    value: i32,
    syslog_equivalent: u8,
}

impl Level {
    pub const OFF: Level = Level::new("OFF", i32::MAX, 0);
    pub const FATAL: Level = Level::new("FATAL", 50_000, 0);
    pub const ERROR: Level = Level::new("ERROR", 40_000, 3);
    pub const WARN: Level = Level::new("WARN", 30_000, 4);
    pub const INFO: Level = Level::new("INFO", 20_000, 6);
    pub const DEBUG: Level = Level::new("DEBUG", 10_000, 7);
    pub const TRACE: Level = Level::new("TRACE", 5_000, 7);
    pub const ALL: Level = Level::new("ALL", i32::MIN, 7);

    /// Levels known to [`FromStr`], most severe first.
    pub const STANDARD: [Level; 8] = [
        Level::OFF,
        Level::FATAL,
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
        Level::ALL,
    ];

    /// Define a custom level.
    pub const fn new(name: &'static str, value: i32, syslog_equivalent: u8) -> Self {
        Self {
            name,
            value,
            syslog_equivalent,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Integer magnitude used for every comparison.
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn syslog_equivalent(&self) -> u8 {
        self.syslog_equivalent
    }

    /// `true` when `self` is at least as severe as `other`.
    #[inline]
    pub fn is_greater_or_equal(&self, other: &Level) -> bool {
        self.value >= other.value
    }

    /// Parse `s`, returning `default` when it names no standard level.
    pub fn to_level(s: &str, default: Level) -> Level {
        s.parse().unwrap_or(default)
    }

    /// Map a magnitude back to its standard level, or `default`.
    pub fn from_value(value: i32, default: Level) -> Level {
        Self::STANDARD
            .iter()
            .copied()
            .find(|level| level.value == value)
            .unwrap_or(default)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self.value {
            v if v >= Level::FATAL.value => BrightRed,
            v if v >= Level::ERROR.value => Red,
            v if v >= Level::WARN.value => Yellow,
            v if v >= Level::INFO.value => Green,
            v if v >= Level::DEBUG.value => Blue,
            _ => BrightBlack,
        }
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Level {}

impl Hash for Level {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::DEBUG
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name)
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" => Ok(Level::OFF),
            "FATAL" => Ok(Level::FATAL),
            "ERROR" => Ok(Level::ERROR),
            "WARN" | "WARNING" => Ok(Level::WARN),
            "INFO" => Ok(Level::INFO),
            "DEBUG" => Ok(Level::DEBUG),
            "TRACE" => Ok(Level::TRACE),
            "ALL" => Ok(Level::ALL),
            _ => Err(LoggerError::invalid_level(s)),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_by_magnitude() {
        assert!(Level::ERROR > Level::WARN);
        assert!(Level::ALL < Level::TRACE);
        assert!(Level::OFF > Level::FATAL);
        assert!(Level::WARN.is_greater_or_equal(&Level::WARN));
        assert!(!Level::INFO.is_greater_or_equal(&Level::WARN));
    }

    #[test]
    fn test_custom_level_compares_by_value() {
        let notice = Level::new("NOTICE", 20_000, 5);
        assert_eq!(notice, Level::INFO);
        assert_eq!(notice.name(), "NOTICE");
    }

    #[test]
    fn test_parse() {
        assert_eq!("warning".parse::<Level>().unwrap(), Level::WARN);
        assert_eq!(" debug ".parse::<Level>().unwrap(), Level::DEBUG);
        assert!("verbose".parse::<Level>().is_err());
        assert_eq!(Level::to_level("bogus", Level::INFO), Level::INFO);
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Level::from_value(40_000, Level::ALL), Level::ERROR);
        assert_eq!(Level::from_value(12, Level::ALL), Level::ALL);
    }

    #[test]
    fn test_serde_uses_name() {
        let json = serde_json::to_string(&Level::ERROR).unwrap();
        assert_eq!(json, "\"ERROR\"");
        let level: Level = serde_json::from_str("\"trace\"").unwrap();
        assert_eq!(level, Level::TRACE);
    }
}
