//! Format-string macros over the façade.
//!
//! These mirror the `tracing` macro shape: the first argument is a
//! [`LoggingService`](crate::LoggingService) or a pointer to one.

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::LoggingService as _;
        $logger.trace_args(format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::LoggingService as _;
        $logger.debug_args(format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::LoggingService as _;
        $logger.info_args(format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::LoggingService as _;
        $logger.warning_args(format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::LoggingService as _;
        $logger.error_args(format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {{
        use $crate::LoggingService as _;
        $logger.fatal_args(format_args!($($arg)*))
    }};
}

/// Logger name for the calling module.
///
/// ```
/// let name: &str = relaylog_core::logger_name!();
/// assert!(!name.is_empty());
/// ```
#[macro_export]
macro_rules! logger_name {
    () => {
        module_path!()
    };
}
