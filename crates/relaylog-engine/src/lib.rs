//! relaylog engine - the live logging pipeline
//!
//! The engine owns the moving parts the façade delegates to:
//! - Sinks (console, file, memory, remote viewer) and the asynchronous
//!   delivery wrapper
//! - Routing rules binding logger-name patterns and minimum severities to sinks
//! - `PipelineConfig`, the ordered registry of sinks and rules, loadable from TOML
//! - `LogManager`, the owner of the live configuration, and the per-name
//!   `EngineLogger` handles it hands out

pub mod async_wrapper;
pub mod config;
pub mod file_config;
pub mod logger;
pub mod manager;
pub mod record;
pub mod rule;
pub mod severity;
pub mod sink;
pub mod sinks;

pub use async_wrapper::{AsyncSinkWrapper, DEFAULT_QUEUE_LIMIT};
pub use config::{PipelineConfig, PipelineSnapshot, SinkEntry};
pub use logger::EngineLogger;
pub use manager::LogManager;
pub use record::LogRecord;
pub use rule::RoutingRule;
pub use severity::Severity;
pub use sink::Sink;
pub use sinks::{ConsoleSink, FileSink, MemorySink, SinkAddress, ViewerSink, ViewerTarget};
