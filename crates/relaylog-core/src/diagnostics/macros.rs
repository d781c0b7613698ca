//! Structured operation macros
//!
//! Every reconfiguration step reports a start, an end, or an end with error,
//! tagged with the emitting module.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use relaylog_core::log_op_start;
/// log_op_start!("configure_remote_target");
/// log_op_start!("configure_remote_target", target_name = "viewer-1");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        $crate::diagnostics::tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::diagnostics::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        $crate::diagnostics::tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::diagnostics::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use relaylog_core::log_op_end;
/// log_op_end!("configure_remote_target", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        $crate::diagnostics::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::diagnostics::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        $crate::diagnostics::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::diagnostics::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation that failed with a [`LogError`](crate::LogError)
///
/// # Example
///
/// ```
/// # use relaylog_core::{log_op_error, LogError};
/// let err = LogError::InvalidArgument { param: "address" };
/// log_op_error!("configure_remote_target", &err, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let err: &$crate::LogError = $err;
        $crate::diagnostics::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::diagnostics::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?err.kind(),
            err_code = err.code(),
            error = %err,
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let err: &$crate::LogError = $err;
        $crate::diagnostics::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::diagnostics::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?err.kind(),
            err_code = err.code(),
            error = %err,
            $($field)*
        );
    }};
}
