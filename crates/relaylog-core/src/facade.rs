//! The logging façade.

use crate::report::render_exception;
use relaylog_core_types::LogLevel;
use std::error::Error;
use std::fmt::Arguments;

/// Logging interface consumers depend on.
///
/// Backends implement [`log`](LoggingService::log); the per-tier methods
/// delegate to it. Implementations must be `Send + Sync` so a single
/// service can be shared across request handlers.
///
/// # Example
///
/// ```
/// use relaylog_core::{LoggingService, NullLoggingService};
/// use relaylog_core::{log_debug, log_info};
/// use std::sync::Arc;
///
/// let logger: Arc<dyn LoggingService> = Arc::new(NullLoggingService::new(None));
/// logger.trace("GetHome");
/// log_debug!(logger, "Current time: '{}'", 42);
/// log_info!(logger, "done");
/// ```
pub trait LoggingService: Send + Sync {
    /// Name the logger was constructed with.
    ///
    /// `None` means the name is resolved from the calling code on first use.
    fn name(&self) -> Option<&str>;

    /// Emit a message at `level`.
    fn log(&self, level: LogLevel, args: Arguments<'_>);

    /// Render `error` into a message and emit it at `level`.
    ///
    /// The rendered message is `message`, the error's own message and,
    /// when `include_stack_trace` is set, its source chain and backtrace.
    fn log_exception(
        &self,
        level: LogLevel,
        error: &(dyn Error + 'static),
        message: Option<&str>,
        include_stack_trace: bool,
    ) {
        let rendered = render_exception(error, message, include_stack_trace);
        self.log(level, format_args!("{rendered}"));
    }

    fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, format_args!("{message}"));
    }

    fn trace_args(&self, args: Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, format_args!("{message}"));
    }

    fn debug_args(&self, args: Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, format_args!("{message}"));
    }

    fn info_args(&self, args: Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, format_args!("{message}"));
    }

    fn warning_args(&self, args: Arguments<'_>) {
        self.log(LogLevel::Warning, args);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, format_args!("{message}"));
    }

    fn error_args(&self, args: Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    /// Log an error value at `Error` level.
    fn error_exception(
        &self,
        error: &(dyn Error + 'static),
        message: Option<&str>,
        include_stack_trace: bool,
    ) {
        self.log_exception(LogLevel::Error, error, message, include_stack_trace);
    }

    fn fatal(&self, message: &str) {
        self.log(LogLevel::Fatal, format_args!("{message}"));
    }

    fn fatal_args(&self, args: Arguments<'_>) {
        self.log(LogLevel::Fatal, args);
    }

    /// Log an error value at `Fatal` level.
    fn fatal_exception(
        &self,
        error: &(dyn Error + 'static),
        message: Option<&str>,
        include_stack_trace: bool,
    ) {
        self.log_exception(LogLevel::Fatal, error, message, include_stack_trace);
    }
}
