//! Façade severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity of a log message, ordered from least to most severe.
///
/// `Off` suppresses all output. `Unknown` is the value of an unset level and
/// behaves as `Off` when used as a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Unknown,
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Off,
}

/// Returned when a level name is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised log level: '{0}'")]
pub struct ParseLevelError(pub String);

/// Returned when a numeric ordinal falls outside the level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("log level ordinal {0} is out of range")]
pub struct LevelOrdinalOutOfRange(pub u8);

impl LogLevel {
    /// All levels in severity order.
    pub const ALL: [LogLevel; 8] = [
        LogLevel::Unknown,
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Off,
    ];

    /// Lowercase canonical name.
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Unknown => "unknown",
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Off => "off",
        }
    }

    /// Parse a level name, resolving anything unrecognised to `Off`.
    ///
    /// Misconfiguration therefore suppresses output instead of flooding it.
    pub fn parse_or_off(name: &str) -> LogLevel {
        name.parse().unwrap_or(LogLevel::Off)
    }

    /// The level this value stands for when used as a minimum threshold.
    pub const fn threshold(self) -> LogLevel {
        match self {
            LogLevel::Unknown => LogLevel::Off,
            other => other,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("warn") {
            return Ok(LogLevel::Warning);
        }
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = LevelOrdinalOutOfRange;

    fn try_from(ordinal: u8) -> Result<Self, LevelOrdinalOutOfRange> {
        LogLevel::ALL
            .get(usize::from(ordinal))
            .copied()
            .ok_or(LevelOrdinalOutOfRange(ordinal))
    }
}
