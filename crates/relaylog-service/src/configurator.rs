//! Runtime reconfiguration of the live pipeline.
//!
//! Every call appends one sink and one match-all rule. Nothing already
//! configured is removed, whether it came from code or from a file loaded
//! before the first call.
//!
//! ## Logging Ownership
//!
//! Each `configure_*` call emits `log_op_start!` on entry and either
//! `log_op_end!` with the registered target name or `log_op_error!`.

use relaylog_core::errors::require_non_blank;
use relaylog_core::{log_op_end, log_op_error, log_op_start, Result};
use relaylog_core_types::LogLevel;
use relaylog_engine::{
    LogManager, PipelineConfig, PipelineSnapshot, RoutingRule, Severity, Sink, ViewerTarget,
    DEFAULT_QUEUE_LIMIT,
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Minimum level used when a host does not configure one.
pub const DEFAULT_MIN_LEVEL: &str = "debug";

/// Whether new sinks are wrapped for asynchronous delivery by default.
pub const DEFAULT_ASYNC: bool = true;

/// Adds sinks to the pipeline owned by a [`LogManager`].
///
/// # Example
///
/// ```
/// use relaylog_engine::LogManager;
/// use relaylog_service::PipelineConfigurator;
/// use std::sync::Arc;
///
/// let manager = Arc::new(LogManager::new());
/// let configurator = PipelineConfigurator::new(Arc::clone(&manager));
/// let name = configurator
///     .configure_remote_address("udp://127.0.0.1:9999", "info", true)
///     .unwrap();
///
/// assert!(name.starts_with("viewer-"));
/// assert_eq!(manager.target_count(), 2);
/// assert_eq!(manager.rule_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfigurator {
    manager: Arc<LogManager>,
    existing: Option<PipelineSnapshot>,
    queue_limit: usize,
}

impl PipelineConfigurator {
    /// Appends to whatever the manager holds when each call runs.
    pub fn new(manager: Arc<LogManager>) -> Self {
        Self {
            manager,
            existing: None,
            queue_limit: DEFAULT_QUEUE_LIMIT,
        }
    }

    /// Remember sinks and rules the host built before the manager was
    /// configured. They are replayed into the configuration this
    /// configurator creates, if it is the one that creates it.
    pub fn with_existing_configuration(manager: Arc<LogManager>, existing: PipelineSnapshot) -> Self {
        Self {
            manager,
            existing: Some(existing),
            queue_limit: DEFAULT_QUEUE_LIMIT,
        }
    }

    /// Queue bound for the async wrappers this configurator creates.
    pub fn with_queue_limit(mut self, queue_limit: usize) -> Self {
        self.queue_limit = queue_limit;
        self
    }

    pub fn manager(&self) -> &Arc<LogManager> {
        &self.manager
    }

    /// Add a viewer sink for `address` under a generated name.
    ///
    /// Returns the name rules route to.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank address or level, `InvalidAddress` if
    /// the address does not parse. The pipeline is unchanged on error.
    pub fn configure_remote_address(
        &self,
        address: &str,
        min_level: &str,
        is_async: bool,
    ) -> Result<String> {
        self.configure_remote_target(ViewerTarget::new(address), min_level, is_async)
    }

    /// Add the viewer sink `target` describes.
    ///
    /// A target without a name is registered as `viewer-<uuid>`.
    ///
    /// # Errors
    ///
    /// As [`configure_remote_address`](Self::configure_remote_address), plus
    /// `DuplicateTarget` when the target's name is already registered.
    pub fn configure_remote_target(
        &self,
        target: ViewerTarget,
        min_level: &str,
        is_async: bool,
    ) -> Result<String> {
        self.instrumented("configure_remote_target", is_async, || {
            require_non_blank("address", Some(target.address.as_str()))?;
            let threshold = parse_threshold(min_level)?;
            let sink: Arc<dyn Sink> = Arc::new(target.build()?);
            self.register(target.name.as_deref(), sink, threshold, is_async)
        })
    }

    /// Add an arbitrary sink.
    ///
    /// A missing or blank `name` is replaced by `<kind>-<uuid>`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a blank level, `DuplicateTarget` when the name
    /// (or its wrapped form) is taken, `Io` if an async worker cannot start.
    pub fn configure_sink(
        &self,
        name: Option<&str>,
        sink: Arc<dyn Sink>,
        min_level: &str,
        is_async: bool,
    ) -> Result<String> {
        self.instrumented("configure_sink", is_async, || {
            let threshold = parse_threshold(min_level)?;
            self.register(name, sink, threshold, is_async)
        })
    }

    fn instrumented(
        &self,
        op: &'static str,
        is_async: bool,
        f: impl FnOnce() -> Result<String>,
    ) -> Result<String> {
        log_op_start!(op, is_async = is_async);
        let start = Instant::now();

        let name = f().map_err(|e| {
            log_op_error!(op, &e, duration_ms = start.elapsed().as_millis() as u64);
            e
        })?;

        log_op_end!(
            op,
            duration_ms = start.elapsed().as_millis() as u64,
            target_name = %name,
            target_count = self.manager.target_count() as u64,
            rule_count = self.manager.rule_count() as u64
        );
        Ok(name)
    }

    fn register(
        &self,
        name: Option<&str>,
        sink: Arc<dyn Sink>,
        threshold: Severity,
        is_async: bool,
    ) -> Result<String> {
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => generated_name(sink.kind()),
        };

        // A configuration created here is installed only once the sink and
        // rule are in; a rejected call leaves the slot as it was.
        self.manager.update(|slot| {
            let mut created = None;
            let config = match slot.as_mut() {
                Some(config) => config,
                None => created.insert(self.fresh_configuration()),
            };
            self.append(config, &name, sink, threshold, is_async)?;
            if let Some(created) = created {
                *slot = Some(created);
            }
            Ok(())
        })?;

        self.manager.reconfig_existing_loggers();
        Ok(name)
    }

    fn append(
        &self,
        config: &mut PipelineConfig,
        name: &str,
        sink: Arc<dyn Sink>,
        threshold: Severity,
        is_async: bool,
    ) -> Result<()> {
        if is_async {
            config.add_async_target(name, sink, self.queue_limit)?;
        } else {
            config.add_target(name, sink)?;
        }
        config.add_rule(RoutingRule::match_all(threshold, name))
    }

    fn fresh_configuration(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new();
        if let Some(existing) = &self.existing {
            tracing::debug!(
                op = "replay_existing_configuration",
                target_count = existing.targets.len() as u64,
                rule_count = existing.rules.len() as u64,
            );
            config.replay(existing);
        }
        config
    }
}

/// Blank names are rejected; anything else unrecognised disables output.
fn parse_threshold(min_level: &str) -> Result<Severity> {
    let min_level = require_non_blank("min_level", Some(min_level))?;
    Ok(Severity::from(LogLevel::parse_or_off(min_level).threshold()))
}

fn generated_name(kind: &str) -> String {
    format!("{kind}-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaylog_core::ErrorKind;
    use relaylog_engine::MemorySink;

    fn configurator() -> PipelineConfigurator {
        PipelineConfigurator::new(Arc::new(LogManager::new()))
    }

    #[test]
    fn test_parse_threshold_fails_closed() {
        assert_eq!(parse_threshold("DEBUG").unwrap(), Severity::Debug);
        assert_eq!(parse_threshold("warning").unwrap(), Severity::Warn);
        assert_eq!(parse_threshold("not-a-real-level").unwrap(), Severity::Off);
        assert_eq!(parse_threshold("unknown").unwrap(), Severity::Off);
        assert_eq!(
            parse_threshold("  ").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_generated_names_use_sink_kind() {
        let name = generated_name("viewer");
        assert!(name.starts_with("viewer-"));
        assert_eq!(name.len(), "viewer-".len() + 36);
    }

    #[test]
    fn test_sync_sink_keeps_its_name() {
        let configurator = configurator();
        let name = configurator
            .configure_sink(Some("mem"), Arc::new(MemorySink::default()), "info", false)
            .unwrap();

        assert_eq!(name, "mem");
        let snapshot = configurator.manager().configuration().unwrap();
        assert_eq!(snapshot.targets.len(), 1);
        assert_eq!(snapshot.rules[0].targets, vec!["mem".to_string()]);
        assert_eq!(snapshot.rules[0].min_level, Severity::Info);
    }

    #[test]
    fn test_blank_sink_name_is_generated() {
        let configurator = configurator();
        let name = configurator
            .configure_sink(Some(" "), Arc::new(MemorySink::default()), "info", false)
            .unwrap();
        assert!(name.starts_with("memory-"));
    }

    #[test]
    fn test_new_remembers_nothing() {
        let manager = Arc::new(LogManager::new());
        PipelineConfigurator::new(Arc::clone(&manager))
            .configure_sink(Some("mem"), Arc::new(MemorySink::default()), "info", false)
            .unwrap();

        let configurator = PipelineConfigurator::new(manager);
        assert!(configurator.existing.is_none());
    }

    #[test]
    fn test_queue_limit_is_applied() {
        let configurator = configurator().with_queue_limit(1);
        configurator
            .configure_sink(Some("mem"), Arc::new(MemorySink::default()), "info", true)
            .unwrap();
        assert_eq!(configurator.manager().target_count(), 2);
    }
}
