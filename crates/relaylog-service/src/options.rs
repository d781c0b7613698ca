//! Service construction options.

use crate::configurator::{DEFAULT_ASYNC, DEFAULT_MIN_LEVEL};
use relaylog_core::{LogError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parameters a host supplies when constructing an
/// [`EngineLoggingService`](crate::EngineLoggingService).
///
/// ```toml
/// name = "shop::api"
/// address = "udp://127.0.0.1:9999"
/// min_level = "info"
/// async = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceOptions {
    pub name: Option<String>,
    /// Viewer address to add to the pipeline, if any.
    pub address: Option<String>,
    pub min_level: String,
    #[serde(rename = "async")]
    pub is_async: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            name: None,
            address: None,
            min_level: DEFAULT_MIN_LEVEL.to_string(),
            is_async: DEFAULT_ASYNC,
        }
    }
}

impl ServiceOptions {
    /// # Errors
    ///
    /// Returns `LogError::InvalidConfig` with the parser's message.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| LogError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `LogError::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source =
            fs::read_to_string(path.as_ref()).map_err(|e| LogError::io("read_service_options", e))?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaylog_core::ErrorKind;

    #[test]
    fn test_defaults() {
        let options = ServiceOptions::from_toml_str("").unwrap();
        assert_eq!(options, ServiceOptions::default());
        assert_eq!(options.min_level, "debug");
        assert!(options.is_async);
    }

    #[test]
    fn test_overrides() {
        let options = ServiceOptions::from_toml_str(
            r#"
            name = "shop::api"
            address = "tcp://127.0.0.1:4505"
            min_level = "warn"
            async = false
            "#,
        )
        .unwrap();
        assert_eq!(options.name.as_deref(), Some("shop::api"));
        assert_eq!(options.address.as_deref(), Some("tcp://127.0.0.1:4505"));
        assert_eq!(options.min_level, "warn");
        assert!(!options.is_async);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = ServiceOptions::from_toml_str("colour = \"blue\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
