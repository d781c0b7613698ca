//! relaylog service - the engine-backed logging service
//!
//! This crate provides:
//! - `PipelineConfigurator`, which adds sinks and routing rules to a live
//!   pipeline without discarding what is already configured
//! - `EngineLoggingService`, the production implementation of the
//!   `LoggingService` façade
//! - `ServiceOptions`, the construction parameters hosts read from their
//!   own configuration

pub mod configurator;
pub mod options;
pub mod service;

pub use configurator::{PipelineConfigurator, DEFAULT_ASYNC, DEFAULT_MIN_LEVEL};
pub use options::ServiceOptions;
pub use service::{EngineLoggingService, SERVICE_FRAMES_TO_SKIP};
