//! The sink abstraction.

use crate::record::LogRecord;
use std::io;

/// An output destination for log records.
///
/// Sinks are shared between the pipeline registry and any async wrapper
/// around them, so they take `&self` and synchronise internally.
/// Identity lives in the pipeline registry, not in the sink.
pub trait Sink: Send + Sync {
    /// Deliver one record.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O failure; the pipeline reports it and moves on.
    fn write(&self, record: &LogRecord) -> io::Result<()>;

    /// Push buffered output to its destination.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O failure.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Short description used in diagnostics and listings.
    fn kind(&self) -> &'static str;
}
