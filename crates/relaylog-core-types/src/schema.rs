//! Canonical schema constants for structured diagnostics
//!
//! These constants keep field names consistent between the diagnostics
//! facility and the tests that assert on it.

// Canonical field keys for structured diagnostics
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_TARGET: &str = "target_name";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Name given to a null logger constructed without one.
pub const DEFAULT_NULL_LOGGER_NAME: &str = "relaylog::null::NullLoggingService";

/// Pattern matching every logger name.
pub const MATCH_ALL_PATTERN: &str = "*";
