//! relaylog core - the logging façade and its shared plumbing
//!
//! This crate provides:
//! - The `LoggingService` façade every consumer depends on
//! - `NullLoggingService`, the zero-effect backend
//! - Caller-name resolution for loggers constructed without a name
//! - Exception report rendering shared by backends
//! - The error taxonomy used by every relaylog crate
//! - The diagnostics facility relaylog uses to report on itself

pub mod caller;
pub mod diagnostics;
pub mod errors;
pub mod facade;
pub mod macros;
pub mod null;
pub mod report;

pub use caller::{BacktraceResolver, CallerNameResolver};
pub use errors::{ErrorKind, LogError, Result};
pub use facade::LoggingService;
pub use null::NullLoggingService;
pub use relaylog_core_types::LogLevel;
pub use report::render_exception;
