//! No-operation backend.

use crate::facade::LoggingService;
use relaylog_core_types::schema::DEFAULT_NULL_LOGGER_NAME;
use relaylog_core_types::LogLevel;
use std::error::Error;
use std::fmt::Arguments;

/// A logging service that discards every message.
///
/// Useful for unit tests and for wiring a consumer when logging is disabled.
///
/// # Example
///
/// ```
/// use relaylog_core::{LoggingService, NullLoggingService};
///
/// let logger = NullLoggingService::new(Some("orders"));
/// logger.info("This message is discarded");
/// assert_eq!(logger.name(), Some("orders"));
/// ```
#[derive(Debug, Clone)]
pub struct NullLoggingService {
    name: String,
}

impl NullLoggingService {
    /// Blank or absent names fall back to [`DEFAULT_NULL_LOGGER_NAME`].
    pub fn new(name: Option<&str>) -> Self {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => DEFAULT_NULL_LOGGER_NAME.to_string(),
        };
        Self { name }
    }
}

impl Default for NullLoggingService {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LoggingService for NullLoggingService {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    #[inline]
    fn log(&self, _level: LogLevel, _args: Arguments<'_>) {}

    #[inline]
    fn log_exception(
        &self,
        _level: LogLevel,
        _error: &(dyn Error + 'static),
        _message: Option<&str>,
        _include_stack_trace: bool,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullLoggingService>();
    }

    #[test]
    fn test_blank_name_uses_default() {
        assert_eq!(
            NullLoggingService::new(Some("  ")).name(),
            Some(DEFAULT_NULL_LOGGER_NAME)
        );
        assert_eq!(
            NullLoggingService::default().name(),
            Some(DEFAULT_NULL_LOGGER_NAME)
        );
    }

    #[test]
    fn test_null_service_as_trait_object() {
        let logger: Box<dyn LoggingService> = Box::new(NullLoggingService::new(Some("x")));
        logger.trace("trace message");
        logger.debug_args(format_args!("debug {}", 1));
        logger.warning("warn message");
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        logger.fatal_exception(&err, None, true);
        assert_eq!(logger.name(), Some("x"));
    }
}
