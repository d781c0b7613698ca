//! Pipeline configuration: the ordered registry of sinks and rules.

use crate::async_wrapper::AsyncSinkWrapper;
use crate::rule::RoutingRule;
use crate::severity::Severity;
use crate::sink::Sink;
use relaylog_core::errors::require_non_blank;
use relaylog_core::{LogError, Result};
use std::fmt;
use std::sync::Arc;

/// Appended to a sink's name when it is registered behind an async wrapper.
/// The wrapper takes the original name.
pub const WRAPPED_SUFFIX: &str = "_wrapped";

/// A named sink in the registry.
#[derive(Clone)]
pub struct SinkEntry {
    pub name: String,
    pub sink: Arc<dyn Sink>,
}

impl fmt::Debug for SinkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkEntry")
            .field("name", &self.name)
            .field("kind", &self.sink.kind())
            .finish()
    }
}

/// Copy of a configuration's sinks and rules, taken so they can be replayed
/// into a configuration created later.
#[derive(Debug, Clone, Default)]
pub struct PipelineSnapshot {
    pub targets: Vec<SinkEntry>,
    pub rules: Vec<RoutingRule>,
}

impl PipelineSnapshot {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.rules.is_empty()
    }
}

/// Ordered sinks plus ordered routing rules.
///
/// Nothing is ever removed: every mutation appends.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    targets: Vec<SinkEntry>,
    rules: Vec<RoutingRule>,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[SinkEntry] {
        &self.targets
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn contains_target(&self, name: &str) -> bool {
        self.targets.iter().any(|t| t.name == name)
    }

    pub fn find_target(&self, name: &str) -> Option<&Arc<dyn Sink>> {
        self.targets
            .iter()
            .find(|t| t.name == name)
            .map(|t| &t.sink)
    }

    /// Register a sink under `name`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank name, `DuplicateTarget` if the name is taken.
    pub fn add_target(&mut self, name: &str, sink: Arc<dyn Sink>) -> Result<()> {
        let name = require_non_blank("name", Some(name))?;
        if self.contains_target(name) {
            return Err(LogError::DuplicateTarget {
                name: name.to_string(),
            });
        }
        tracing::debug!(op = "add_target", target_name = name, sink_kind = sink.kind());
        self.targets.push(SinkEntry {
            name: name.to_string(),
            sink,
        });
        Ok(())
    }

    /// Register `sink` behind an [`AsyncSinkWrapper`].
    ///
    /// The sink is registered as `{name}_wrapped` and the wrapper as `name`,
    /// so the registry grows by two entries while rules route to `name`.
    /// Both names are checked before anything is registered.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank name, `DuplicateTarget` if either name
    /// is taken, `Io` if the worker thread cannot start.
    pub fn add_async_target(
        &mut self,
        name: &str,
        sink: Arc<dyn Sink>,
        queue_limit: usize,
    ) -> Result<()> {
        let name = require_non_blank("name", Some(name))?;
        let wrapped_name = format!("{name}{WRAPPED_SUFFIX}");
        for candidate in [name, wrapped_name.as_str()] {
            if self.contains_target(candidate) {
                return Err(LogError::DuplicateTarget {
                    name: candidate.to_string(),
                });
            }
        }

        let wrapper = AsyncSinkWrapper::new(name, Arc::clone(&sink), queue_limit)?;
        self.add_target(&wrapped_name, sink)?;
        self.add_target(name, Arc::new(wrapper))
    }

    /// Append a rule. Every target it names must already be registered.
    ///
    /// # Errors
    ///
    /// `UnknownTarget` naming the first missing target.
    pub fn add_rule(&mut self, rule: RoutingRule) -> Result<()> {
        if let Some(missing) = rule.targets.iter().find(|t| !self.contains_target(t)) {
            return Err(LogError::UnknownTarget {
                name: missing.clone(),
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            targets: self.targets.clone(),
            rules: self.rules.clone(),
        }
    }

    /// Re-add a snapshot's sinks and rules, skipping sink names already
    /// registered and rules already present.
    pub fn replay(&mut self, snapshot: &PipelineSnapshot) {
        for entry in &snapshot.targets {
            if !self.contains_target(&entry.name) {
                self.targets.push(entry.clone());
            }
        }
        for rule in &snapshot.rules {
            if !self.rules.contains(rule) {
                self.rules.push(rule.clone());
            }
        }
    }

    /// Whether any rule routes `logger` at `severity`.
    pub fn is_enabled(&self, logger: &str, severity: Severity) -> bool {
        self.rules
            .iter()
            .any(|r| r.matches_name(logger) && r.accepts(severity))
    }

    /// Bit set of the severities enabled for `logger`.
    pub(crate) fn enabled_mask(&self, logger: &str) -> u8 {
        Severity::EMITTABLE
            .into_iter()
            .filter(|s| self.is_enabled(logger, *s))
            .fold(0, |mask, s| mask | s.bit())
    }

    /// Sinks a record from `logger` at `severity` is delivered to, in rule
    /// order, each at most once. A matching final rule ends the walk.
    pub fn route(&self, logger: &str, severity: Severity) -> Vec<(String, Arc<dyn Sink>)> {
        let mut routed: Vec<(String, Arc<dyn Sink>)> = Vec::new();
        for rule in &self.rules {
            if !rule.matches_name(logger) || !rule.accepts(severity) {
                continue;
            }
            for target in &rule.targets {
                if routed.iter().any(|(name, _)| name == target) {
                    continue;
                }
                if let Some(sink) = self.find_target(target) {
                    routed.push((target.clone(), Arc::clone(sink)));
                }
            }
            if rule.is_final {
                break;
            }
        }
        routed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use relaylog_core::ErrorKind;

    fn memory() -> Arc<dyn Sink> {
        Arc::new(MemorySink::default())
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut config = PipelineConfig::new();
        config.add_target("console", memory()).unwrap();
        let err = config.add_target("console", memory()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateTarget);
        assert_eq!(config.target_count(), 1);
    }

    #[test]
    fn test_rule_requires_known_targets() {
        let mut config = PipelineConfig::new();
        let err = config
            .add_rule(RoutingRule::match_all(Severity::Info, "nowhere"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTarget);
        assert_eq!(config.rule_count(), 0);
    }

    #[test]
    fn test_async_target_registers_sink_and_wrapper() {
        let mut config = PipelineConfig::new();
        config.add_async_target("viewer", memory(), 8).unwrap();

        let names: Vec<&str> = config.targets().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["viewer_wrapped", "viewer"]);
        assert_eq!(config.find_target("viewer").unwrap().kind(), "async");
        assert_eq!(config.find_target("viewer_wrapped").unwrap().kind(), "memory");
    }

    #[test]
    fn test_async_target_checks_both_names_first() {
        let mut config = PipelineConfig::new();
        config.add_target("viewer_wrapped", memory()).unwrap();
        let err = config.add_async_target("viewer", memory(), 8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateTarget);
        assert_eq!(config.target_count(), 1);
    }

    #[test]
    fn test_replay_skips_existing_entries() {
        let mut original = PipelineConfig::new();
        original.add_target("file", memory()).unwrap();
        original
            .add_rule(RoutingRule::match_all(Severity::Info, "file"))
            .unwrap();
        let snapshot = original.snapshot();

        let mut config = PipelineConfig::new();
        config.replay(&snapshot);
        config.replay(&snapshot);
        assert_eq!(config.target_count(), 1);
        assert_eq!(config.rule_count(), 1);
    }

    #[test]
    fn test_route_honours_order_and_final() {
        let mut config = PipelineConfig::new();
        config.add_target("a", memory()).unwrap();
        config.add_target("b", memory()).unwrap();
        config
            .add_rule(RoutingRule::new("shop::*", Severity::Debug, ["a"]).with_final(true))
            .unwrap();
        config
            .add_rule(RoutingRule::match_all(Severity::Info, "b"))
            .unwrap();

        let names = |logger: &str, s: Severity| -> Vec<String> {
            config.route(logger, s).into_iter().map(|(n, _)| n).collect()
        };
        assert_eq!(names("shop::orders", Severity::Info), vec!["a"]);
        assert_eq!(names("admin", Severity::Info), vec!["b"]);
        assert_eq!(names("admin", Severity::Debug), Vec::<String>::new());
        // Final only applies once the rule matched the level too.
        assert_eq!(names("shop::orders", Severity::Trace), Vec::<String>::new());
    }

    #[test]
    fn test_enabled_mask() {
        let mut config = PipelineConfig::new();
        config.add_target("a", memory()).unwrap();
        config
            .add_rule(RoutingRule::match_all(Severity::Error, "a"))
            .unwrap();
        let mask = config.enabled_mask("x");
        assert_eq!(mask, Severity::Error.bit() | Severity::Fatal.bit());
    }
}
