//! The engine-backed logging service.

use crate::configurator::PipelineConfigurator;
use crate::options::ServiceOptions;
use relaylog_core::{BacktraceResolver, CallerNameResolver, LoggingService, Result};
use relaylog_core_types::LogLevel;
use relaylog_engine::{EngineLogger, LogManager, Severity, ViewerTarget};
use std::error::Error;
use std::fmt::{self, Arguments};
use std::sync::{Arc, OnceLock};

/// Frames belonging to the service itself between a façade call and the
/// resolver. Library frames are skipped by prefix as well, so this only
/// needs to cover frames without symbol paths.
pub const SERVICE_FRAMES_TO_SKIP: usize = 2;

/// [`LoggingService`] that forwards to an [`EngineLogger`].
///
/// The engine logger is looked up on first use and kept for the lifetime
/// of the service. A service without a name takes it from the calling code.
///
/// # Example
///
/// ```
/// use relaylog_core::{log_info, LoggingService};
/// use relaylog_engine::LogManager;
/// use relaylog_service::EngineLoggingService;
/// use std::sync::Arc;
///
/// let manager = Arc::new(LogManager::new());
/// let logger = EngineLoggingService::with_remote_address(
///     Arc::clone(&manager),
///     Some("blah"),
///     "udp://127.0.0.1:9999",
///     "debug",
///     true,
/// )
/// .unwrap();
///
/// log_info!(logger, "listening on {}", 8080);
/// assert_eq!(manager.rule_count(), 1);
/// ```
pub struct EngineLoggingService {
    name: Option<String>,
    manager: Arc<LogManager>,
    resolver: Arc<dyn CallerNameResolver>,
    logger: OnceLock<EngineLogger>,
}

impl EngineLoggingService {
    /// A blank `name` is treated as absent.
    pub fn new(manager: Arc<LogManager>, name: Option<&str>) -> Self {
        Self {
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            manager,
            resolver: Arc::new(BacktraceResolver::new()),
            logger: OnceLock::new(),
        }
    }

    /// Create the service and add a viewer sink for `address`.
    ///
    /// # Errors
    ///
    /// Whatever [`PipelineConfigurator::configure_remote_address`] returns.
    pub fn with_remote_address(
        manager: Arc<LogManager>,
        name: Option<&str>,
        address: &str,
        min_level: &str,
        is_async: bool,
    ) -> Result<Self> {
        let service = Self::new(manager, name);
        PipelineConfigurator::new(Arc::clone(&service.manager))
            .configure_remote_address(address, min_level, is_async)?;
        Ok(service)
    }

    /// Create the service and add the viewer sink `target` describes.
    ///
    /// # Errors
    ///
    /// Whatever [`PipelineConfigurator::configure_remote_target`] returns.
    pub fn with_remote_target(
        manager: Arc<LogManager>,
        name: Option<&str>,
        target: ViewerTarget,
        min_level: &str,
        is_async: bool,
    ) -> Result<Self> {
        let service = Self::new(manager, name);
        PipelineConfigurator::new(Arc::clone(&service.manager))
            .configure_remote_target(target, min_level, is_async)?;
        Ok(service)
    }

    /// Create the service from host configuration, adding a viewer sink
    /// when an address is set.
    ///
    /// # Errors
    ///
    /// As [`with_remote_address`](Self::with_remote_address).
    pub fn from_options(manager: Arc<LogManager>, options: &ServiceOptions) -> Result<Self> {
        match options.address.as_deref() {
            Some(address) => Self::with_remote_address(
                manager,
                options.name.as_deref(),
                address,
                &options.min_level,
                options.is_async,
            ),
            None => Ok(Self::new(manager, options.name.as_deref())),
        }
    }

    /// Replace the resolver used when the service has no name.
    pub fn with_resolver(mut self, resolver: Arc<dyn CallerNameResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn manager(&self) -> &Arc<LogManager> {
        &self.manager
    }

    /// Name of the engine logger, resolving it if needed. Empty when
    /// neither a name nor a caller could be found.
    pub fn resolved_name(&self) -> &str {
        self.logger().name()
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.logger().is_enabled(Severity::from(level))
    }

    fn logger(&self) -> &EngineLogger {
        self.logger.get_or_init(|| {
            let name = match &self.name {
                Some(name) => name.clone(),
                None => self
                    .resolver
                    .resolve(SERVICE_FRAMES_TO_SKIP)
                    .unwrap_or_default(),
            };
            self.manager.get_logger(&name)
        })
    }
}

impl LoggingService for EngineLoggingService {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        let severity = Severity::from(level);
        let logger = self.logger();
        if logger.is_enabled(severity) {
            logger.log(severity, args);
        }
    }

    // Checked before rendering; capturing a backtrace is expensive.
    fn log_exception(
        &self,
        level: LogLevel,
        error: &(dyn Error + 'static),
        message: Option<&str>,
        include_stack_trace: bool,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        let rendered = relaylog_core::render_exception(error, message, include_stack_trace);
        self.log(level, format_args!("{rendered}"));
    }
}

impl fmt::Debug for EngineLoggingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineLoggingService")
            .field("name", &self.name)
            .field("resolved", &self.logger.get().map(EngineLogger::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_is_absent() {
        let service = EngineLoggingService::new(Arc::new(LogManager::new()), Some("  "));
        assert_eq!(service.name(), None);
    }

    #[test]
    fn test_unconfigured_service_is_silent() {
        let service = EngineLoggingService::new(Arc::new(LogManager::new()), Some("quiet"));
        for level in LogLevel::ALL {
            assert!(!service.is_enabled(level));
        }
        service.fatal("nothing to see");
    }
}
