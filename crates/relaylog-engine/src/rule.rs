//! Routing rules.

use crate::severity::Severity;
use relaylog_core_types::schema::MATCH_ALL_PATTERN;

/// Binds a logger-name pattern and a minimum severity to target names.
///
/// Patterns: `*` matches everything, `prefix*`, `*suffix` and `*infix*`
/// match by position, anything else must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pub logger_pattern: String,
    pub min_level: Severity,
    pub targets: Vec<String>,
    /// Stop evaluating later rules once this one matched.
    pub is_final: bool,
}

impl RoutingRule {
    pub fn new(
        logger_pattern: impl Into<String>,
        min_level: Severity,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            logger_pattern: logger_pattern.into(),
            min_level,
            targets: targets.into_iter().map(Into::into).collect(),
            is_final: false,
        }
    }

    /// A rule for every logger name.
    pub fn match_all(min_level: Severity, target: impl Into<String>) -> Self {
        let target: String = target.into();
        Self::new(MATCH_ALL_PATTERN, min_level, [target])
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn matches_name(&self, logger: &str) -> bool {
        let pattern = self.logger_pattern.as_str();
        if pattern == MATCH_ALL_PATTERN {
            return true;
        }
        let leading = pattern.starts_with('*');
        let trailing = pattern.len() > 1 && pattern.ends_with('*');
        let core = &pattern[usize::from(leading)..pattern.len() - usize::from(trailing)];
        match (leading, trailing) {
            (true, true) => logger.contains(core),
            (true, false) => logger.ends_with(core),
            (false, true) => logger.starts_with(core),
            (false, false) => logger == pattern,
        }
    }

    /// Whether a record at `severity` clears this rule's threshold.
    pub fn accepts(&self, severity: Severity) -> bool {
        self.min_level != Severity::Off && severity != Severity::Off && severity >= self.min_level
    }
}
