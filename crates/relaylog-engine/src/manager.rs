//! Ownership of the live pipeline.

use crate::config::{PipelineConfig, PipelineSnapshot};
use crate::file_config;
use crate::logger::EngineLogger;
use crate::severity::Severity;
use crate::sink::Sink;
use relaylog_core::{LogError, Result};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Owns the pipeline configuration and hands out loggers bound to it.
///
/// The pipeline starts unconfigured. It becomes configured when a
/// configuration is set, loaded, or created by an [`update`](Self::update),
/// and never returns to unconfigured.
///
/// Every change must be followed by
/// [`reconfig_existing_loggers`](Self::reconfig_existing_loggers) so that
/// loggers already handed out drop their cached level decisions.
#[derive(Debug, Default)]
pub struct LogManager {
    configuration: RwLock<Option<PipelineConfig>>,
    generation: AtomicU64,
    lookups: AtomicUsize,
}

static GLOBAL: OnceLock<Arc<LogManager>> = OnceLock::new();

impl LogManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager that starts out configured.
    pub fn with_configuration(config: PipelineConfig) -> Self {
        Self {
            configuration: RwLock::new(Some(config)),
            ..Self::default()
        }
    }

    /// The process-wide manager, for hosts that do not inject their own.
    pub fn global() -> Arc<LogManager> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(LogManager::new())))
    }

    pub fn has_configuration(&self) -> bool {
        self.read(|config| config.is_some())
    }

    /// Copy of the current sinks and rules, `None` while unconfigured.
    pub fn configuration(&self) -> Option<PipelineSnapshot> {
        self.read(|config| config.as_ref().map(PipelineConfig::snapshot))
    }

    pub fn target_count(&self) -> usize {
        self.read(|config| config.as_ref().map_or(0, PipelineConfig::target_count))
    }

    pub fn rule_count(&self) -> usize {
        self.read(|config| config.as_ref().map_or(0, PipelineConfig::rule_count))
    }

    /// Replace the whole configuration and re-evaluate existing loggers.
    pub fn set_configuration(&self, config: PipelineConfig) {
        {
            let mut slot = self
                .configuration
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *slot = Some(config);
        }
        self.reconfig_existing_loggers();
    }

    /// Replace the configuration with the contents of a TOML file.
    ///
    /// # Errors
    ///
    /// Any read, parse or sink-opening failure; the current configuration
    /// is left untouched.
    pub fn load_configuration_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let config = file_config::load(path.as_ref())?;
        tracing::info!(
            op = "load_configuration_file",
            path = %path.as_ref().display(),
            target_count = config.target_count(),
            rule_count = config.rule_count(),
        );
        self.set_configuration(config);
        Ok(())
    }

    /// Mutate the configuration slot under the writer lock.
    ///
    /// The closure sees `None` while unconfigured and may create the
    /// configuration. Loggers are not re-evaluated; callers do that once
    /// they are done.
    ///
    /// # Errors
    ///
    /// Whatever the closure returns. Changes it made before failing stay.
    pub fn update<R>(&self, f: impl FnOnce(&mut Option<PipelineConfig>) -> Result<R>) -> Result<R> {
        let mut slot = self
            .configuration
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut slot)
    }

    /// Invalidate every logger's cached level decisions.
    pub fn reconfig_existing_loggers(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(op = "reconfig_existing_loggers", generation);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Look up the logger for `name`.
    ///
    /// Handles are cheap; callers are expected to keep the one they get.
    pub fn get_logger(self: &Arc<Self>, name: &str) -> EngineLogger {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        EngineLogger::new(name, Arc::clone(self))
    }

    /// How many times [`get_logger`](Self::get_logger) has been called.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Flush every registered sink.
    ///
    /// # Errors
    ///
    /// Returns the first failure after attempting every sink.
    pub fn flush(&self) -> Result<()> {
        let sinks: Vec<(String, Arc<dyn Sink>)> = self.read(|config| {
            config
                .iter()
                .flat_map(|c| c.targets())
                .map(|t| (t.name.clone(), Arc::clone(&t.sink)))
                .collect()
        });
        let mut first_error = None;
        for (name, sink) in sinks {
            if let Err(err) = sink.flush() {
                tracing::warn!(op = "flush", target_name = %name, error = %err);
                first_error.get_or_insert(LogError::io(format!("flush {name}"), err));
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub(crate) fn enabled_mask(&self, logger: &str) -> u8 {
        self.read(|config| config.as_ref().map_or(0, |c| c.enabled_mask(logger)))
    }

    pub(crate) fn route(&self, logger: &str, severity: Severity) -> Vec<(String, Arc<dyn Sink>)> {
        self.read(|config| {
            config
                .as_ref()
                .map(|c| c.route(logger, severity))
                .unwrap_or_default()
        })
    }

    fn read<R>(&self, f: impl FnOnce(&Option<PipelineConfig>) -> R) -> R {
        let guard = self
            .configuration
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RoutingRule;
    use crate::sinks::MemorySink;

    #[test]
    fn test_starts_unconfigured() {
        let manager = LogManager::new();
        assert!(!manager.has_configuration());
        assert!(manager.configuration().is_none());
        assert_eq!(manager.target_count(), 0);
    }

    #[test]
    fn test_update_creates_configuration() {
        let manager = LogManager::new();
        manager
            .update(|slot| {
                let config = slot.get_or_insert_with(PipelineConfig::new);
                config.add_target("mem", Arc::new(MemorySink::default()))
            })
            .unwrap();
        assert!(manager.has_configuration());
        assert_eq!(manager.target_count(), 1);
    }

    #[test]
    fn test_reconfig_bumps_generation() {
        let manager = LogManager::new();
        let before = manager.generation();
        manager.set_configuration(PipelineConfig::new());
        assert_eq!(manager.generation(), before + 1);
    }

    #[test]
    fn test_lookup_count() {
        let manager = Arc::new(LogManager::new());
        let _a = manager.get_logger("a");
        let _b = manager.get_logger("b");
        assert_eq!(manager.lookup_count(), 2);
    }

    #[test]
    fn test_flush_reaches_async_targets() {
        let memory = Arc::new(MemorySink::default());
        let mut config = PipelineConfig::new();
        config.add_async_target("mem", memory.clone(), 16).unwrap();
        config
            .add_rule(RoutingRule::match_all(Severity::Info, "mem"))
            .unwrap();
        let manager = Arc::new(LogManager::with_configuration(config));

        manager
            .get_logger("orders")
            .log(Severity::Info, format_args!("queued"));
        manager.flush().unwrap();

        assert_eq!(memory.messages(), vec!["queued"]);
    }
}
