//! Per-name logger handles.

use crate::manager::LogManager;
use crate::record::LogRecord;
use crate::severity::Severity;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Low byte holds the enabled-severity mask, the rest the manager
/// generation it was computed for, offset by one so zero means "never".
const MASK_BITS: u32 = 8;

/// A logger bound to one name in a [`LogManager`].
///
/// Level decisions are cached and recomputed once the manager's
/// configuration generation moves.
#[derive(Clone)]
pub struct EngineLogger {
    name: Arc<str>,
    manager: Arc<LogManager>,
    cache: Arc<AtomicU64>,
}

impl EngineLogger {
    pub(crate) fn new(name: &str, manager: Arc<LogManager>) -> Self {
        Self {
            name: Arc::from(name),
            manager,
            cache: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manager(&self) -> &Arc<LogManager> {
        &self.manager
    }

    pub fn is_enabled(&self, severity: Severity) -> bool {
        severity != Severity::Off && self.mask() & severity.bit() != 0
    }

    /// Deliver a message to every sink the configuration routes it to.
    ///
    /// Sink failures are reported through diagnostics and never reach the
    /// caller.
    pub fn log(&self, severity: Severity, args: fmt::Arguments<'_>) {
        if !self.is_enabled(severity) {
            return;
        }
        let record = LogRecord::new(severity, self.name.as_ref(), args.to_string());
        for (target, sink) in self.manager.route(&self.name, severity) {
            if let Err(err) = sink.write(&record) {
                tracing::warn!(
                    op = "sink_write",
                    target_name = %target,
                    logger = %self.name,
                    error = %err,
                );
            }
        }
    }

    fn mask(&self) -> u8 {
        let tag = self.manager.generation() + 1;
        let cached = self.cache.load(Ordering::Acquire);
        if cached >> MASK_BITS == tag {
            return (cached & 0xff) as u8;
        }
        let mask = self.manager.enabled_mask(&self.name);
        self.cache
            .store((tag << MASK_BITS) | u64::from(mask), Ordering::Release);
        mask
    }
}

impl fmt::Debug for EngineLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineLogger")
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::rule::RoutingRule;
    use crate::sinks::MemorySink;

    fn manager_with(min: Severity) -> (Arc<LogManager>, Arc<MemorySink>) {
        let memory = Arc::new(MemorySink::default());
        let mut config = PipelineConfig::new();
        config.add_target("mem", memory.clone()).unwrap();
        config.add_rule(RoutingRule::match_all(min, "mem")).unwrap();
        (Arc::new(LogManager::with_configuration(config)), memory)
    }

    #[test]
    fn test_unconfigured_logger_is_silent() {
        let manager = Arc::new(LogManager::new());
        let logger = manager.get_logger("x");
        for severity in Severity::EMITTABLE {
            assert!(!logger.is_enabled(severity));
        }
    }

    #[test]
    fn test_below_threshold_is_dropped() {
        let (manager, memory) = manager_with(Severity::Warn);
        let logger = manager.get_logger("x");
        logger.log(Severity::Info, format_args!("quiet"));
        logger.log(Severity::Error, format_args!("loud {}", 1));
        assert_eq!(memory.messages(), vec!["loud 1"]);
    }

    #[test]
    fn test_cache_follows_reconfiguration() {
        let (manager, memory) = manager_with(Severity::Error);
        let logger = manager.get_logger("x");
        assert!(!logger.is_enabled(Severity::Debug));

        manager
            .update(|slot| {
                let config = slot.get_or_insert_with(PipelineConfig::new);
                config.add_rule(RoutingRule::match_all(Severity::Debug, "mem"))
            })
            .unwrap();
        // Stale until loggers are re-evaluated.
        assert!(!logger.is_enabled(Severity::Debug));

        manager.reconfig_existing_loggers();
        assert!(logger.is_enabled(Severity::Debug));
        logger.log(Severity::Debug, format_args!("now visible"));
        assert_eq!(memory.messages(), vec!["now visible"]);
    }

    #[test]
    fn test_off_is_never_enabled() {
        let (manager, _) = manager_with(Severity::Trace);
        assert!(!manager.get_logger("x").is_enabled(Severity::Off));
    }
}
