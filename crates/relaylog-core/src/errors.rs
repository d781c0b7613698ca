use relaylog_core_types::LevelOrdinalOutOfRange;
use thiserror::Error;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code that callers and tests can match on
/// without depending on message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required argument was absent or blank
    InvalidArgument,
    /// A level ordinal fell outside the closed enumeration
    OutOfRange,
    /// A target name is already registered in the pipeline
    DuplicateTarget,
    /// A rule references a target that is not registered
    UnknownTarget,
    /// A sink address could not be parsed
    InvalidAddress,
    /// A configuration document was malformed
    InvalidConfig,
    Io,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ErrorKind::OutOfRange => "ERR_OUT_OF_RANGE",
            ErrorKind::DuplicateTarget => "ERR_DUPLICATE_TARGET",
            ErrorKind::UnknownTarget => "ERR_UNKNOWN_TARGET",
            ErrorKind::InvalidAddress => "ERR_INVALID_ADDRESS",
            ErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ErrorKind::Io => "ERR_IO",
        }
    }
}

/// Errors raised while constructing services or reconfiguring the pipeline.
///
/// Façade logging calls never produce these.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Value cannot be null or blank: {param}")]
    InvalidArgument { param: &'static str },

    #[error("Log level ordinal out of range: {ordinal}")]
    LevelOutOfRange { ordinal: u8 },

    #[error("Target already registered: {name}")]
    DuplicateTarget { name: String },

    #[error("Rule references unknown target: {name}")]
    UnknownTarget { name: String },

    #[error("Invalid sink address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid pipeline configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("I/O failure during {op}: {source}")]
    Io {
        op: String,
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            LogError::LevelOutOfRange { .. } => ErrorKind::OutOfRange,
            LogError::DuplicateTarget { .. } => ErrorKind::DuplicateTarget,
            LogError::UnknownTarget { .. } => ErrorKind::UnknownTarget,
            LogError::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            LogError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            LogError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Wrap an I/O error with the operation that produced it
    pub fn io(op: impl Into<String>, source: std::io::Error) -> Self {
        LogError::Io {
            op: op.into(),
            source,
        }
    }
}

impl From<LevelOrdinalOutOfRange> for LogError {
    fn from(err: LevelOrdinalOutOfRange) -> Self {
        LogError::LevelOutOfRange { ordinal: err.0 }
    }
}

/// Reject a missing or whitespace-only argument.
///
/// # Errors
///
/// Returns `LogError::InvalidArgument` naming `param`.
pub fn require_non_blank<'a>(param: &'static str, value: Option<&'a str>) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LogError::InvalidArgument { param }),
    }
}
