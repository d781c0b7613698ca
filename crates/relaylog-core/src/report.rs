//! Rendering of error values into log messages.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt::Write;

pub const EXCEPTION_MESSAGE_SEPARATOR: &str = " Exception Message: ";
pub const STACK_TRACE_SEPARATOR: &str = " Stack Trace: ";

/// Render an error into a single message.
///
/// Layout: `prefix`, then `" Exception Message: "` (both only when `prefix`
/// is non-blank), then the error's display text. With `include_stack_trace`
/// set, `" Stack Trace: "` follows with one `caused by:` line per source
/// error and, when the platform captured one, the backtrace of the logging
/// site.
pub fn render_exception(
    error: &(dyn Error + 'static),
    prefix: Option<&str>,
    include_stack_trace: bool,
) -> String {
    let backtrace = if include_stack_trace {
        Some(Backtrace::capture())
    } else {
        None
    };
    render_with_backtrace(error, prefix, backtrace.as_ref())
}

fn render_with_backtrace(
    error: &(dyn Error + 'static),
    prefix: Option<&str>,
    backtrace: Option<&Backtrace>,
) -> String {
    let mut out = String::new();
    if let Some(prefix) = prefix.filter(|p| !p.trim().is_empty()) {
        out.push_str(prefix);
        out.push_str(EXCEPTION_MESSAGE_SEPARATOR);
    }
    let _ = write!(out, "{error}");

    let Some(backtrace) = backtrace else {
        return out;
    };

    out.push_str(STACK_TRACE_SEPARATOR);
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(out, "\n  caused by: {cause}");
        source = cause.source();
    }
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = write!(out, "\n{backtrace}");
    }
    out
}
