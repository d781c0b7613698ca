//! Core types shared across relaylog crates
//!
//! This crate provides foundational types used by the façade, the engine
//! and the backend service:
//!
//! - **Levels**: `LogLevel`, the façade severity enumeration, with fail-closed parsing
//! - **Schema constants**: canonical field keys, event names and default names

pub mod level;
pub mod schema;

pub use level::{LevelOrdinalOutOfRange, LogLevel, ParseLevelError};
